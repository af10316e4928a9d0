pub mod confirmation;
pub mod controller;
pub mod events;
pub mod form;
pub mod gateway;
pub mod mutation;
pub mod query;
pub mod validation;

pub use confirmation::{ConfirmationGate, GateError, GatedAction, PendingConfirmation};
pub use controller::{FormError, TaskController};
pub use events::{ControllerEvent, MutationAction, Notification, NotificationKind};
pub use form::{FormMode, TaskForm};
pub use gateway::{GatewayReply, HttpTaskGateway, MissingTaskGateway, TaskGateway};
pub use mutation::{MutationCoordinator, MutationFailed};
pub use query::{QueryError, QueryStateManager, QueryView};
pub use validation::{FieldDescriptor, ValidationState, REQUIRED_MESSAGE, TASK_FIELDS};

#[cfg(test)]
#[path = "tests/support.rs"]
mod test_support;
