mod caller_resolver;

pub use caller_resolver::{CallerResolver, ResolveCallerError};
