pub use sea_orm_migration::prelude::*;

mod m20241202_000003_create_projects_table;
mod m20241204_000005_create_files_table;

pub struct Migrator;

#[async_trait::async_trait]
impl MigratorTrait for Migrator {
    fn migrations() -> Vec<Box<dyn MigrationTrait>> {
        vec![
            Box::new(m20241202_000003_create_projects_table::Migration),
            Box::new(m20241204_000005_create_files_table::Migration),
        ]
    }
}
