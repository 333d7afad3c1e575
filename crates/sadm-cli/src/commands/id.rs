use crate::support::{exit_with, parse_entity_type_or_exit, print_json};
use sadm_id::{AudioType, EntityId, IdFields, compose_generic, compose_typed, compose_untyped};
use serde_json::{Value, json};

pub struct EncodeArgs {
    pub entity_type: String,
    pub sequence: u64,
    pub audio_type: Option<u64>,
    pub sub: u32,
    pub json: bool,
}

fn fields_json(fields: IdFields) -> Value {
    match fields {
        IdFields::Null => json!({}),
        IdFields::Untyped { sequence, .. } => json!({ "sequence": sequence }),
        IdFields::Generic { sequence, .. } => json!({ "sequence": sequence }),
        IdFields::FrameFormat { frame, part } => json!({ "frame": frame, "part": part }),
        IdFields::Typed {
            audio_type,
            sequence,
            sub,
            ..
        } => json!({
            "audio_type": audio_type.code(),
            "audio_type_definition": audio_type.definition(),
            "sequence": sequence,
            "sub": sub,
        }),
        IdFields::AltValueSet { sequence, sub } => json!({ "sequence": sequence, "sub": sub }),
    }
}

fn describe(id: EntityId) -> Value {
    let fields = id.fields().unwrap_or_else(|e| exit_with(e));
    json!({
        "id": id.to_string(),
        "raw": format!("0x{:016X}", id.raw()),
        "entity_type": id.entity_type().as_str(),
        "fields": fields_json(fields),
    })
}

fn print_description(payload: &Value, json_output: bool) {
    if json_output {
        print_json(payload);
        return;
    }
    println!("{}", payload["id"].as_str().unwrap_or_default());
    println!("  Type: {}", payload["entity_type"].as_str().unwrap_or_default());
    println!("  Raw: {}", payload["raw"].as_str().unwrap_or_default());
    if let Some(fields) = payload["fields"].as_object() {
        for (name, value) in fields {
            println!("  {name}: {value}");
        }
    }
}

pub fn decode(text: String, json_output: bool) {
    let id: EntityId = text
        .parse()
        .unwrap_or_else(|e| exit_with(format!("{text}: {e}")));
    print_description(&describe(id), json_output);
}

pub fn encode(args: EncodeArgs) {
    let entity_type = parse_entity_type_or_exit(&args.entity_type);
    let composed = if entity_type.is_typed() {
        let code = args
            .audio_type
            .unwrap_or_else(|| exit_with(format!("{entity_type} ids need --audio-type")));
        let audio_type = AudioType::from_code(code).unwrap_or_else(|e| exit_with(e));
        let sequence = u16::try_from(args.sequence)
            .unwrap_or_else(|_| exit_with(format!("sequence {} exceeds 16 bits", args.sequence)));
        compose_typed(entity_type, audio_type, sequence, args.sub)
    } else if entity_type.is_generic() {
        let sequence = u32::try_from(args.sequence)
            .unwrap_or_else(|_| exit_with(format!("sequence {} exceeds 32 bits", args.sequence)));
        compose_generic(entity_type, sequence)
    } else {
        compose_untyped(entity_type, args.sequence, args.sub)
    };
    let id = composed.unwrap_or_else(|e| exit_with(e));
    print_description(&describe(id), args.json);
}
