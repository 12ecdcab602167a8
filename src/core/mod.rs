pub mod codec;
pub mod dispatch;
pub mod subject;

pub use crate::domain::model::{DispatchReceipt, ProvisioningTask, TaskAction, ZonePolicy};
pub use crate::domain::ports::{ConfigProvider, PublishError, Publisher};
pub use crate::utils::error::Result;
pub use dispatch::{DispatchContext, DispatchPipeline};
