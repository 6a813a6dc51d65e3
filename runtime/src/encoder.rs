use link::{CommandTable, CommandToken};
use vision::RecognitionOutcome;

/// What, if anything, goes over the wire for one frame.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Command {
    Send(CommandToken),
    /// A known person with no token in the table.
    Unmapped(String),
    /// Nobody in view.
    Silent,
}

pub fn encode(table: &CommandTable, outcome: &RecognitionOutcome) -> Command {
    match outcome {
        RecognitionOutcome::Known(label) => match table.lookup(label) {
            Some(token) => Command::Send(token.clone()),
            None => Command::Unmapped(label.clone()),
        },
        RecognitionOutcome::Unknown => Command::Send(table.unknown().clone()),
        RecognitionOutcome::NoneDetected => Command::Silent,
    }
}
