use surefact_logging::sf_warn;

use crate::{Effect, JobController, Msg};

/// Pure update function: applies a message to the controller and returns any effects.
pub fn update(mut controller: JobController, msg: Msg) -> (JobController, Vec<Effect>) {
    let effects = match msg {
        Msg::StartRequested(topic) => match controller.start(&topic) {
            Ok(effects) => effects,
            Err(err) => {
                sf_warn!("Start rejected: {}", err);
                Vec::new()
            }
        },
        Msg::ResetRequested => controller.reset(),
        Msg::Stream(event) => controller.handle_event(event),
    };

    (controller, effects)
}
