// Scoped module lifecycle: enter, run body, always exit
use futures::future::BoxFuture;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use tracing::{debug, warn};

use crate::application::module::Module;
use crate::error::Result;

/// Run `body` inside the module's scope.
///
/// `enter` runs first; if it fails the body is skipped and `exit` is not called.
/// Once `enter` succeeded, `exit` runs on every path: normal return, an `Err`
/// from the body, or a panic (resumed after `exit`). A body error takes
/// precedence over an exit error.
///
/// # Example
/// ```text
/// let dispatched = scoped(&mut remote, |m| {
///     Box::pin(async move { m.run(Invocation::command("ping", Params::new())).await })
/// })
/// .await?;
/// ```
pub async fn scoped<M, T, F>(module: &mut M, body: F) -> Result<T>
where
    M: Module + ?Sized,
    F: for<'m> FnOnce(&'m mut M) -> BoxFuture<'m, Result<T>>,
{
    module.enter().await?;
    debug!(module = %module.name(), "Entered module scope");

    let outcome = AssertUnwindSafe(body(&mut *module)).catch_unwind().await;
    let exited = module.exit().await;
    debug!(module = %module.name(), "Left module scope");

    match outcome {
        Ok(Ok(value)) => exited.map(|_| value),
        Ok(Err(e)) => {
            if let Err(exit_err) = exited {
                warn!(module = %module.name(), error = %exit_err, "Scope exit failed after body error");
            }
            Err(e)
        }
        Err(panic) => {
            if let Err(exit_err) = exited {
                warn!(module = %module.name(), error = %exit_err, "Scope exit failed after body panic");
            }
            std::panic::resume_unwind(panic)
        }
    }
}
