//! One line of terminal input, from submission to the printed reply.

use crate::chat::Renderer;
use crate::session::{ChatSession, SubmitOutcome, Transport};

/// Submits `line` and prints whatever the session appended.
///
/// The typing indicator is shown only once the session has accepted the
/// line; a rejected line produces no output at all.
pub async fn run_turn<T: Transport, R: Renderer>(
    session: &mut ChatSession<T>,
    renderer: &mut R,
    line: &str,
) -> SubmitOutcome {
    let pending = match session.begin(line) {
        Ok(pending) => pending,
        Err(rejection) => return SubmitOutcome::Ignored(rejection),
    };

    renderer.start_typing();
    let result = session.transport().send(pending.request()).await;
    let outcome = session.finish(pending, result);
    renderer.finish_typing();

    if let Some(reply) = session.transcript().last() {
        renderer.print_assistant(session.locale().assistant_name(), &reply.content);
    }
    outcome
}
