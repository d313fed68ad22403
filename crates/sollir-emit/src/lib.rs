/*! Turn lowered SOLLIR back into readable text.
 *
 * Generated block graphs are easiest to check by eye: each function prints as its blocks in
 * creation order, labelled with the construct that produced them, with unreachable blocks flagged.
 * JSON output carries the same contract for other tools.
 */

pub mod config;
pub mod emitter;
pub mod formatter;
pub mod output;
pub mod sollir_emitter;

pub use config::{EmitterConfig, IndentStyle, VerbosityLevel};
pub use emitter::{EmitContext, EmitHelper, EmitResult, Emitter};
pub use formatter::IRFormatter;
pub use output::{write_contract, OutputFormat};
pub use sollir_emitter::SollirEmitter;
