/// Implementation of `regconv wrap`.
///
/// Prepends the big-endian schema id to a raw Avro body so the result can
/// be published with an `application/vnd.<subject>.*+avro` content type.
use std::fs;

use anyhow::{Context, Result};
use regconv_wire::Envelope;

use crate::WrapArgs;

/// Run the `regconv wrap` command.
///
/// # Errors
///
/// Returns an error if the input cannot be read or the output cannot be
/// written.
pub fn run(args: &WrapArgs) -> Result<()> {
    let body =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;

    let wrapped = Envelope::wrap(args.schema_id, &body);
    fs::write(&args.output, &wrapped)
        .with_context(|| format!("cannot write {}", args.output.display()))?;

    tracing::info!(
        schema_id = args.schema_id,
        body_len = body.len(),
        output = %args.output.display(),
        "wrapped payload"
    );
    Ok(())
}
