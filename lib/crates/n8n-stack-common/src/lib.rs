pub mod cfn;
pub mod types;

pub use cfn::{Output, Parameter, Resource, Tag, Template, TemplateModelError};
pub use types::{StackOutputs, outputs};
