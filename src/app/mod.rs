// Application layer - Use case interactors

pub mod compress_interactor;
pub mod container;
pub mod dispatcher;
pub mod inspect_interactor;
pub mod split_interactor;

// Re-export interactors
pub use compress_interactor::{CompressInteractor, CompressRequest, CompressResponse};
pub use container::{AppContainer, DefaultAppContainer};
pub use dispatcher::{Operation, OperationDispatcher, OperationResult};
pub use inspect_interactor::{InspectInteractor, ValidationReport};
pub use split_interactor::{SplitInteractor, SplitRequest, SplitResponse};
