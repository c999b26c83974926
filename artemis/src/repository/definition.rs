use crate::errors::{ErrorKind, MappingError, MappingResult};
use crate::query::{QueryCompiler, QueryKind, QueryMethod};
use indexmap::IndexMap;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

/// Shape a repository method adapts its store reply into.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReturnShape {
    /// The single match, if any.
    Instance,
    /// The single match wrapped as optional.
    Optional,
    /// Every match in store reply order.
    List,
    /// Every distinct match, order irrelevant.
    Set,
    /// Every match, converted on demand.
    Stream,
    /// Whether anything matched.
    Boolean,
    /// Nothing.
    Unit,
}

impl ReturnShape {
    fn accepts(&self, kind: QueryKind) -> bool {
        match kind {
            QueryKind::Delete => *self == ReturnShape::Unit,
            QueryKind::Exists => *self == ReturnShape::Boolean,
            QueryKind::Find | QueryKind::Get => !matches!(self, ReturnShape::Boolean | ReturnShape::Unit),
        }
    }
}

impl Display for ReturnShape {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            ReturnShape::Instance => write!(f, "instance"),
            ReturnShape::Optional => write!(f, "optional"),
            ReturnShape::List => write!(f, "list"),
            ReturnShape::Set => write!(f, "set"),
            ReturnShape::Stream => write!(f, "stream"),
            ReturnShape::Boolean => write!(f, "boolean"),
            ReturnShape::Unit => write!(f, "unit"),
        }
    }
}

/// A declared repository method: its compiled query and return shape.
#[derive(Debug, Clone)]
pub struct MethodBinding {
    method: Arc<QueryMethod>,
    shape: ReturnShape,
}

impl MethodBinding {
    pub fn method(&self) -> &QueryMethod {
        &self.method
    }

    pub fn shape(&self) -> ReturnShape {
        self.shape
    }
}

/// Lookup table of the query methods a repository declares.
///
/// Every method name is compiled when the definition is built, so grammar
/// errors and shape mismatches surface before the first call.
///
/// # Examples
///
/// ```rust,ignore
/// let definition = RepositoryDefinition::new(&[
///     ("findByName", ReturnShape::Optional),
///     ("findByAgeGreaterThanOrderByName", ReturnShape::List),
///     ("deleteByName", ReturnShape::Unit),
/// ])?;
/// ```
#[derive(Debug, Clone)]
pub struct RepositoryDefinition {
    inner: Arc<RepositoryDefinitionInner>,
}

#[derive(Debug)]
struct RepositoryDefinitionInner {
    methods: IndexMap<String, MethodBinding>,
}

impl RepositoryDefinition {
    /// Builds a definition compiling through the process-wide [QueryCompiler].
    pub fn new(methods: &[(&str, ReturnShape)]) -> MappingResult<Self> {
        RepositoryDefinition::with_compiler(&QueryCompiler::global(), methods)
    }

    pub fn with_compiler(compiler: &QueryCompiler, methods: &[(&str, ReturnShape)]) -> MappingResult<Self> {
        let mut bindings = IndexMap::with_capacity(methods.len());
        for (name, shape) in methods {
            let method = compiler.compile(name)?;
            if !shape.accepts(method.kind()) {
                log::error!("Method {} cannot return {}", name, shape);
                return Err(MappingError::new(
                    &format!("Method {} cannot return {}", name, shape),
                    ErrorKind::DynamicQueryError,
                ));
            }

            let binding = MethodBinding { method, shape: *shape };
            if bindings.insert(name.to_string(), binding).is_some() {
                log::error!("Method {} is declared more than once", name);
                return Err(MappingError::new(
                    &format!("Method {} is declared more than once", name),
                    ErrorKind::DynamicQueryError,
                ));
            }
        }

        Ok(RepositoryDefinition {
            inner: Arc::new(RepositoryDefinitionInner { methods: bindings }),
        })
    }

    pub fn method(&self, name: &str) -> Option<&MethodBinding> {
        self.inner.methods.get(name)
    }

    /// Declared method names, in declaration order.
    pub fn names(&self) -> Vec<&str> {
        self.inner.methods.keys().map(|name| name.as_str()).collect()
    }

    pub fn size(&self) -> usize {
        self.inner.methods.len()
    }
}
