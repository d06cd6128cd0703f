pub mod auth;
pub mod chat;
pub mod plan;
pub mod session;
pub mod storage;

pub use auth::{LoginRequest, SignupRequest, UpdateImageRequest};
pub use chat::{AskRequest, ChatEntry};
pub use plan::{CheckoutOrder, PaymentProof, Plan, PlanDraft};
pub use session::{Role, Session};
pub use storage::{StoredFile, UploadedImage};
