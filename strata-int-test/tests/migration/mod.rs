mod directory_source_test;
mod migrator_test;
