//! Repository layer.
//!
//! Each repository is a zero-sized struct providing async CRUD methods
//! that accept `&PgPool` as the first argument. Mutations take the acting
//! user's id explicitly wherever a row records who created it.

pub mod contract_repo;
pub mod dashboard_repo;
pub mod document_repo;
pub mod expense_repo;
pub mod project_repo;
pub mod reference_repo;
pub mod report_repo;
pub mod role_repo;
pub mod schedule_repo;
pub mod task_repo;
pub mod user_repo;

pub use contract_repo::ContractRepo;
pub use dashboard_repo::DashboardRepo;
pub use document_repo::DocumentRepo;
pub use expense_repo::ExpenseRepo;
pub use project_repo::ProjectRepo;
pub use reference_repo::ReferenceRepo;
pub use report_repo::ReportRepo;
pub use role_repo::RoleRepo;
pub use schedule_repo::ScheduleRepo;
pub use task_repo::TaskRepo;
pub use user_repo::UserRepo;
