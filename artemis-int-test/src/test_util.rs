use artemis::artemis::Artemis;
use artemis::artemis_builder::ArtemisBuilder;
use artemis::errors::MappingResult;
use artemis::mapping::MetadataRegistry;
use artemis::query::QueryCompiler;
use artemis::store::memory::{MemoryAsyncRecordManager, MemoryRecordManager};
use artemis::store::{AsyncRecordManager, DatabaseQualifier, DatabaseType, RecordManager};
use std::backtrace::Backtrace;
use std::time::{Duration, Instant};
use std::thread;

/// Runs a test between a setup and a teardown step, retrying a failed run.
///
/// The teardown also runs when the test itself fails.
pub fn run_test<T, B, A>(before: B, test: T, after: A)
where
    T: Fn(TestContext) -> MappingResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    B: Fn() -> MappingResult<TestContext> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
    A: Fn(TestContext) -> MappingResult<()> + std::panic::UnwindSafe + std::panic::RefUnwindSafe,
{
    const MAX_RETRIES: u32 = 3;
    let mut last_error: Option<String> = None;

    for attempt in 1..=MAX_RETRIES {
        let start_time = Instant::now();

        let result = std::panic::catch_unwind(|| {
            let backtrace = Backtrace::capture();
            match before() {
                Ok(ctx) => match test(ctx.clone()) {
                    Ok(_) => after(ctx).map_err(|e| (format!("After run failed: {:?}", e), backtrace.to_string())),
                    Err(e) => {
                        let _ = after(ctx);
                        Err((format!("Test failed: {:?}", e), backtrace.to_string()))
                    }
                },
                Err(e) => Err((format!("Before run failed: {:?}", e), backtrace.to_string())),
            }
        });

        let elapsed = start_time.elapsed();
        let error = match result {
            Ok(Ok(_)) => return,
            Ok(Err((e, bt))) => {
                if !bt.is_empty() && !bt.contains("disabled") {
                    format!("{}\n{}", e, bt)
                } else {
                    e
                }
            }
            Err(panic_err) => {
                if let Some(s) = panic_err.downcast_ref::<&str>() {
                    format!("Panic: {}", s)
                } else if let Some(s) = panic_err.downcast_ref::<String>() {
                    format!("Panic: {}", s)
                } else {
                    "Panic: unknown payload".to_string()
                }
            }
        };

        if attempt < MAX_RETRIES {
            eprintln!(
                "\n========== Test Attempt {}/{} Failed (took {:?}) ==========",
                attempt, MAX_RETRIES, elapsed
            );
            eprintln!("{}", error);
            thread::sleep(Duration::from_millis(50 * attempt as u64));
        }
        last_error = Some(error);
    }

    panic!(
        "Test failed after {} attempts. Last error: {}",
        MAX_RETRIES,
        last_error.unwrap_or_default()
    );
}

/// Engine and in-memory stores shared by one test run.
#[derive(Clone)]
pub struct TestContext {
    artemis: Artemis,
    document_store: MemoryRecordManager,
    column_store: MemoryRecordManager,
}

impl TestContext {
    pub fn artemis(&self) -> Artemis {
        self.artemis.clone()
    }

    /// Store behind the default document qualifier, sync and async.
    pub fn document_store(&self) -> MemoryRecordManager {
        self.document_store.clone()
    }

    /// Store behind the default column qualifier. It has no bulk insert path.
    pub fn column_store(&self) -> MemoryRecordManager {
        self.column_store.clone()
    }
}

pub fn create_test_context() -> MappingResult<TestContext> {
    create_test_context_with(|builder| builder)
}

/// A context whose builder is further configured by `configure`, e.g. to add
/// persist listeners.
pub fn create_test_context_with<F>(configure: F) -> MappingResult<TestContext>
where
    F: FnOnce(ArtemisBuilder) -> ArtemisBuilder,
{
    let document_store = MemoryRecordManager::new(DatabaseType::Document);
    let column_store = MemoryRecordManager::new(DatabaseType::Column).without_bulk();
    let async_store = MemoryAsyncRecordManager::from_manager(document_store.clone())
        .with_delay(Duration::from_millis(20));

    let builder = Artemis::builder()
        .registry(MetadataRegistry::new())
        .manager(DatabaseQualifier::of_document(), RecordManager::new(document_store.clone()))
        .manager(DatabaseQualifier::of_column(), RecordManager::new(column_store.clone()))
        .async_manager(DatabaseQualifier::of_document(), AsyncRecordManager::new(async_store));

    Ok(TestContext {
        artemis: configure(builder).build()?,
        document_store,
        column_store,
    })
}

/// A compiler private to one test, so cache assertions do not race.
pub fn private_compiler() -> QueryCompiler {
    QueryCompiler::new()
}

pub fn cleanup(ctx: TestContext) -> MappingResult<()> {
    ctx.document_store.clear();
    ctx.column_store.clear();
    Ok(())
}
