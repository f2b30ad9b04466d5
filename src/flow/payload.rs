//! Typed tool payloads.
//!
//! Every tool the canvas ships with has its own payload struct carrying the
//! fields that tool understands. Fields the struct does not know about are
//! kept in `extra`, and payloads for tools outside the known set are stored
//! as [`ToolPayload::Custom`].
//!
//! Decoding is lossless: an absent field is `None`, a recorded `null` is
//! `Some(None)`, and numbers keep their integer or float form.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Number, Value};
use tracing::warn;

macro_rules! payload_struct {
    (
        $(#[$meta:meta])*
        $name:ident {
            $( $(#[$field_meta:meta])* $field:ident : $ty:ty ),* $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
        #[serde(rename_all = "camelCase")]
        pub struct $name {
            $(
                $(#[$field_meta])*
                #[serde(
                    default,
                    with = "::serde_with::rust::double_option",
                    skip_serializing_if = "Option::is_none"
                )]
                pub $field: Option<Option<$ty>>,
            )*
            #[serde(flatten)]
            pub extra: Map<String, Value>,
        }
    };
}

payload_struct!(
    /// drawSquare / drawCircle
    ShapePayload {
        x: Number,
        y: Number,
        size: Number,
        stroke_color: String,
        background_color: String,
        fill_style: String,
        stroke_width: Number,
        stroke_style: String,
        roughness: Number,
        opacity: Number,
        roundness: Number,
        angle: Number,
    }
);

payload_struct!(LinePayload {
    x: Number,
    y: Number,
    width: Number,
    height: Number,
    stroke_color: String,
    stroke_width: Number,
    stroke_style: String,
    roughness: Number,
    opacity: Number,
    angle: Number,
});

payload_struct!(TextPayload {
    x: Number,
    y: Number,
    text: String,
    font_size: Number,
    font_family: Value,
    text_align: String,
    vertical_align: String,
    stroke_color: String,
    background_color: String,
    fill_style: String,
    stroke_width: Number,
    stroke_style: String,
    roughness: Number,
    opacity: Number,
    angle: Number,
});

payload_struct!(ImagePayload {
    x: Number,
    y: Number,
    image_url: String,
    width: Number,
    height: Number,
    scale: Number,
    opacity: Number,
    angle: Number,
});

payload_struct!(FramePayload {
    x: Number,
    y: Number,
    width: Number,
    height: Number,
    name: String,
    stroke_color: String,
    background_color: String,
    fill_style: String,
    stroke_width: Number,
    stroke_style: String,
    roughness: Number,
    opacity: Number,
    angle: Number,
});

payload_struct!(
    /// move / moveTo
    MovePayload {
        element_id: String,
        x: Number,
        y: Number,
    }
);

payload_struct!(ElementRef { element_id: String });

payload_struct!(StrokePayload {
    element_id: String,
    stroke_color: String,
    stroke_width: Number,
    stroke_style: String,
});

payload_struct!(ArrowPayload {
    from_element_id: String,
    to_element_id: String,
    stroke_color: String,
    stroke_width: Number,
    stroke_style: String,
    start_arrowhead: String,
    end_arrowhead: String,
    roughness: Number,
    opacity: Number,
});

payload_struct!(UserPayload {
    username: String,
    email: String,
    role: String,
    active: bool,
});

payload_struct!(JobPayload {
    title: String,
    description: String,
    salary: Number,
    location: String,
    #[serde(rename = "type")]
    job_type: String,
});

payload_struct!(EmailPayload {
    to: String,
    subject: String,
    body: String,
    priority: String,
});

/// Payload of a recorded tool call, keyed by tool name.
#[derive(Clone, Debug, PartialEq)]
pub enum ToolPayload {
    DrawSquare(ShapePayload),
    DrawCircle(ShapePayload),
    DrawLine(LinePayload),
    AddText(TextPayload),
    AddImage(ImagePayload),
    AddFrame(FramePayload),
    Move(MovePayload),
    MoveTo(MovePayload),
    DeleteElement(ElementRef),
    EditStroke(StrokePayload),
    AddArrow(ArrowPayload),
    CreateUser(UserPayload),
    CreateJob(JobPayload),
    SendEmail(EmailPayload),
    /// Tools outside the built-in set, or payloads that do not fit their
    /// tool's shape.
    Custom(Value),
}

impl ToolPayload {
    pub const KNOWN_TOOLS: [&'static str; 14] = [
        "drawSquare",
        "drawCircle",
        "drawLine",
        "addText",
        "addImage",
        "addFrame",
        "move",
        "moveTo",
        "deleteElement",
        "editStroke",
        "addArrow",
        "createUser",
        "createJob",
        "sendEmail",
    ];

    /// Decodes `value` into the variant for `tool`. Never fails: anything
    /// that does not decode is kept verbatim as `Custom`.
    pub fn from_value(tool: &str, value: Value) -> Self {
        match Self::decode(tool, &value) {
            Ok(Some(payload)) => payload,
            Ok(None) => Self::Custom(value),
            Err(err) => {
                warn!(tool, %err, "payload does not match the tool's shape, keeping it as custom");
                Self::Custom(value)
            }
        }
    }

    pub fn from_map(tool: &str, map: Map<String, Value>) -> Self {
        Self::from_value(tool, Value::Object(map))
    }

    fn decode(tool: &str, value: &Value) -> serde_json::Result<Option<Self>> {
        let payload = match tool {
            "drawSquare" => Self::DrawSquare(Deserialize::deserialize(value)?),
            "drawCircle" => Self::DrawCircle(Deserialize::deserialize(value)?),
            "drawLine" => Self::DrawLine(Deserialize::deserialize(value)?),
            "addText" => Self::AddText(Deserialize::deserialize(value)?),
            "addImage" => Self::AddImage(Deserialize::deserialize(value)?),
            "addFrame" => Self::AddFrame(Deserialize::deserialize(value)?),
            "move" => Self::Move(Deserialize::deserialize(value)?),
            "moveTo" => Self::MoveTo(Deserialize::deserialize(value)?),
            "deleteElement" => Self::DeleteElement(Deserialize::deserialize(value)?),
            "editStroke" => Self::EditStroke(Deserialize::deserialize(value)?),
            "addArrow" => Self::AddArrow(Deserialize::deserialize(value)?),
            "createUser" => Self::CreateUser(Deserialize::deserialize(value)?),
            "createJob" => Self::CreateJob(Deserialize::deserialize(value)?),
            "sendEmail" => Self::SendEmail(Deserialize::deserialize(value)?),
            _ => return Ok(None),
        };
        Ok(Some(payload))
    }

    pub fn to_value(&self) -> Value {
        let encoded = match self {
            Self::DrawSquare(p) | Self::DrawCircle(p) => serde_json::to_value(p),
            Self::DrawLine(p) => serde_json::to_value(p),
            Self::AddText(p) => serde_json::to_value(p),
            Self::AddImage(p) => serde_json::to_value(p),
            Self::AddFrame(p) => serde_json::to_value(p),
            Self::Move(p) | Self::MoveTo(p) => serde_json::to_value(p),
            Self::DeleteElement(p) => serde_json::to_value(p),
            Self::EditStroke(p) => serde_json::to_value(p),
            Self::AddArrow(p) => serde_json::to_value(p),
            Self::CreateUser(p) => serde_json::to_value(p),
            Self::CreateJob(p) => serde_json::to_value(p),
            Self::SendEmail(p) => serde_json::to_value(p),
            Self::Custom(value) => return value.clone(),
        };
        encoded.unwrap_or_else(|err| {
            warn!(%err, "failed to encode tool payload");
            Value::Null
        })
    }

    /// The payload as an open field map, if it is an object.
    pub fn to_map(&self) -> Option<Map<String, Value>> {
        match self.to_value() {
            Value::Object(map) => Some(map),
            _ => None,
        }
    }

    /// Reads a single field by its wire name.
    pub fn field(&self, name: &str) -> Option<Value> {
        self.to_map().and_then(|mut map| map.remove(name))
    }

    pub fn is_custom(&self) -> bool {
        matches!(self, Self::Custom(_))
    }
}
