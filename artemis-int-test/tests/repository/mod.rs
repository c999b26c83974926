mod repository_negative_test;
mod repository_search_test;
mod repository_test;
