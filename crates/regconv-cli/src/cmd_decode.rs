/// Implementation of `regconv decode`.
///
/// Loads a registry manifest into an in-memory registry, runs the payload
/// through a [`MessageConverter`], and prints the decoded record as pretty
/// JSON. With `--target-schema`, the record is evolved into that reader
/// schema first (fields the writer added are dropped, missing ones take
/// their defaults).
///
/// # Manifest format
///
/// ```json
/// {
///   "schemas": [
///     { "id": 7, "subject": "orders", "version": 3,
///       "schema": { "type": "record", "name": "Order", "fields": [...] } }
///   ]
/// }
/// ```
///
/// `schema` may also be the definition as a JSON string.
use std::fs;
use std::io::Write;
use std::sync::Arc;

use anyhow::{Context, Result, anyhow, bail};
use apache_avro::types::Value as AvroValue;
use regconv_decoder::{ConverterConfig, DecodedMessage, Message, MessageConverter};
use regconv_registry::{CachingRegistry, MemorySchemaRegistry};
use regconv_types::{
    GenericRecordContainer, SchemaDescriptor, TargetRegistry, TargetType, get_mime_type,
};

use crate::DecodeArgs;

/// Run the `regconv decode` command.
///
/// # Errors
///
/// Returns an error if any file cannot be read, the manifest or target
/// schema is invalid, or the conversion fails.
pub fn run(args: &DecodeArgs, format: &str) -> Result<()> {
    let bytes =
        fs::read(&args.file).with_context(|| format!("cannot read {}", args.file.display()))?;
    let manifest = fs::read_to_string(&args.registry)
        .with_context(|| format!("cannot read {}", args.registry.display()))?;
    let registry = MemorySchemaRegistry::from_manifest_str(&manifest)
        .with_context(|| format!("invalid registry manifest {}", args.registry.display()))?;

    let config = ConverterConfig {
        format: format.to_string(),
        ..ConverterConfig::default()
    };
    let mut converter =
        MessageConverter::with_config(Arc::new(CachingRegistry::new(registry)), config);

    let target = match &args.target_schema {
        Some(path) => {
            let definition = fs::read_to_string(path)
                .with_context(|| format!("cannot read {}", path.display()))?;
            let reader = SchemaDescriptor::parse(&definition)
                .with_context(|| format!("invalid target schema {}", path.display()))?;
            if let Ok(Some(mime)) = get_mime_type(&reader) {
                tracing::debug!(mime_type = %mime, "target schema advertises a content type");
            }
            let target = TargetType::new(
                reader
                    .full_name()
                    .unwrap_or_else(|| TargetType::GENERIC_RECORD.to_string()),
            );
            let mut targets = TargetRegistry::new();
            targets.register(target.clone(), GenericRecordContainer::factory(reader));
            converter = converter.with_targets(targets);
            target
        }
        None => TargetType::generic_record(),
    };

    let message = Message::with_content_type(bytes, &args.content_type);
    let decoded = converter
        .convert_from(&message, &target, None)
        .with_context(|| format!("cannot decode {}", args.file.display()))?
        .ok_or_else(|| anyhow!("no content type for {}", args.file.display()))?;

    tracing::debug!(
        schema_id = decoded.schema_id,
        schema_version = decoded.schema_version,
        writer = decoded.writer_schema.full_name().as_deref().unwrap_or("<unnamed>"),
        "resolved writer schema"
    );

    let json = serde_json::Value::try_from(into_avro_value(decoded)?)
        .context("decoded value has no JSON representation")?;
    let rendered = serde_json::to_string_pretty(&json).context("cannot render JSON")?;

    if let Some(path) = &args.output {
        fs::write(path, rendered.as_bytes())
            .with_context(|| format!("cannot write {}", path.display()))?;
    } else {
        let stdout = std::io::stdout();
        let mut handle = stdout.lock();
        handle
            .write_all(rendered.as_bytes())
            .context("cannot write to stdout")?;
        handle.write_all(b"\n").context("cannot write to stdout")?;
    }

    Ok(())
}

/// The Avro value behind either kind of result.
fn into_avro_value(decoded: DecodedMessage) -> Result<AvroValue> {
    if let Some(container) = decoded.container::<GenericRecordContainer>() {
        return match container.value() {
            Some(value) => Ok(value.clone()),
            None => bail!("target container was not populated"),
        };
    }
    decoded
        .into_record()
        .ok_or_else(|| anyhow!("decoded value is neither a record nor a generic container"))
}
