/// Implementation of `regconv inspect`.
///
/// Unwraps a payload file as the converter would and prints the result.
///
/// # Output format
///
/// ```text
/// Envelope: wrapped, schema id 7
/// Body:     12 bytes
///   0000  02 0e 6f 72 64 65 72 2d 31 00 00 00               ..order-1...
/// ```
use std::fmt::Write as _;
use std::fs;

use anyhow::{Context, Result};
use regconv_wire::{ContentType, Envelope, MimeClassifier};

use crate::InspectArgs;

/// Run the `regconv inspect` command.
///
/// # Errors
///
/// Returns an error if the file cannot be read, the content type does
/// not parse, or a wrapped payload is shorter than the id prefix.
pub fn run(args: &InspectArgs, format: &str) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let content_type = ContentType::parse(&args.content_type)
        .with_context(|| format!("invalid content type {:?}", args.content_type))?;

    let classifier = MimeClassifier::for_format(format);
    let envelope = Envelope::unwrap_with(&classifier, bytes.into(), &content_type)
        .with_context(|| format!("cannot unwrap {}", args.file.display()))?;

    match envelope.schema_id {
        Some(id) => println!("Envelope: wrapped, schema id {id}"),
        None => match classifier.versioned(&content_type) {
            Some(v) => println!(
                "Envelope: plain, subject {} version {}",
                v.subject, v.version
            ),
            None => println!("Envelope: plain, no schema reference"),
        },
    }
    println!("Body:     {} bytes", envelope.payload.len());

    let head = &envelope.payload[..envelope.payload.len().min(args.head)];
    for (i, chunk) in head.chunks(16).enumerate() {
        println!("  {:04x}  {}", i * 16, hex_line(chunk));
    }

    Ok(())
}

// ── Hex helpers ───────────────────────────────────────────────────────────────

/// Up to 16 bytes as padded hex followed by the printable ASCII column.
fn hex_line(chunk: &[u8]) -> String {
    let hex = chunk
        .iter()
        .fold(String::with_capacity(chunk.len() * 3), |mut s, b| {
            if !s.is_empty() {
                s.push(' ');
            }
            let _ = write!(s, "{b:02x}");
            s
        });
    let ascii: String = chunk
        .iter()
        .map(|&b| if b.is_ascii_graphic() { b as char } else { '.' })
        .collect();
    format!("{hex:<48}  {ascii}")
}
