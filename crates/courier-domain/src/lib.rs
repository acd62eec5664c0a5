// courier-domain library entry point
pub mod errors;
pub mod order;
pub mod payment;
pub mod progress;
pub mod role;
pub mod status;
pub mod step;
pub mod user;

pub use errors::DomainError;
pub use order::{Order, OrderPhase};
pub use payment::Payment;
pub use progress::ProgressRecord;
pub use role::Role;
pub use status::{Status, StatusCategory};
pub use step::StepDefinition;
pub use user::User;
