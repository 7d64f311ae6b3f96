/// Implementation of `regconv classify`.
///
/// # Output format
///
/// ```text
/// content type: application/vnd.orders.v3+avro
/// wrapped:      no
/// versioned:    yes (prefix=vnd subject=orders version=3)
/// supported:    yes
/// ```
use anyhow::{Context, Result};
use regconv_wire::{ContentType, MimeClassifier};

use crate::ClassifyArgs;

/// Run the `regconv classify` command.
///
/// # Errors
///
/// Returns an error if the argument is not a parseable content type.
pub fn run(args: &ClassifyArgs, format: &str) -> Result<()> {
    let content_type = ContentType::parse(&args.content_type)
        .with_context(|| format!("invalid content type {:?}", args.content_type))?;
    let classifier = MimeClassifier::for_format(format);

    println!("content type: {content_type}");
    println!("wrapped:      {}", yes_no(classifier.is_wildcard(&content_type)));
    match classifier.versioned(&content_type) {
        Some(v) => println!(
            "versioned:    yes (prefix={} subject={} version={})",
            v.prefix, v.subject, v.version
        ),
        None => println!("versioned:    no"),
    }
    println!("supported:    {}", yes_no(classifier.is_supported(&content_type)));

    Ok(())
}

fn yes_no(flag: bool) -> &'static str {
    if flag { "yes" } else { "no" }
}
