//! Request argument rules for creating and updating videos.
//!
//! Validation runs on the raw JSON body before the store is touched, so a
//! rejected request never causes a write.

use serde::Serialize;
use serde_json::{Map, Value};
use snafu::{OptionExt as _, ResultExt as _, Snafu};

use crate::model::{NewVideo, VideoPatch};

pub const MAX_NAME_LENGTH: usize = 100;

#[derive(Debug, Snafu, Serialize)]
#[snafu(visibility(pub(crate)))]
pub enum ValidationError {
    #[snafu(display("{field}: {help}"))]
    MissingField {
        field: &'static str,
        help: &'static str,
    },

    #[snafu(display("{field}: {help}, expected {expected}"))]
    WrongType {
        field: &'static str,
        expected: &'static str,
        help: &'static str,
    },

    #[snafu(display("{field}: must be at most {max} characters long"))]
    TooLong { field: &'static str, max: usize },

    #[snafu(display("request body is not valid JSON"))]
    MalformedBody {
        #[serde(skip)]
        source: serde_json::Error,
    },

    #[snafu(display("request body must be a JSON object"))]
    NotAnObject,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Kind {
    Text { max_length: usize },
    Integer,
}

impl Kind {
    fn expected(self) -> &'static str {
        match self {
            Kind::Text { .. } => "a string",
            Kind::Integer => "an integer",
        }
    }
}

/// One named argument of a request body together with its help text.
#[derive(Debug, Clone, Copy)]
struct Argument {
    field: &'static str,
    kind: Kind,
    help: &'static str,
}

const NAME: Kind = Kind::Text {
    max_length: MAX_NAME_LENGTH,
};

const CREATE_NAME: Argument = Argument::new("name", NAME, "Name of the video is required");
const CREATE_VIEWS: Argument = Argument::new("views", Kind::Integer, "views on the video is required");
const CREATE_LIKES: Argument = Argument::new("likes", Kind::Integer, "likes on the video is required");

const UPDATE_NAME: Argument = Argument::new("name", NAME, "Name of the video is required");
const UPDATE_VIEWS: Argument = Argument::new("views", Kind::Integer, "Views on the video are required");
const UPDATE_LIKES: Argument = Argument::new("likes", Kind::Integer, "Likes on the video are required");

impl Argument {
    const fn new(field: &'static str, kind: Kind, help: &'static str) -> Self {
        Self { field, kind, help }
    }

    /// Look the argument up, `null` counts as absent.
    fn lookup<'a>(&self, body: &'a Map<String, Value>) -> Option<&'a Value> {
        body.get(self.field).filter(|value| !value.is_null())
    }

    fn wrong_type(&self) -> ValidationError {
        WrongTypeSnafu {
            field: self.field,
            expected: self.kind.expected(),
            help: self.help,
        }
        .build()
    }

    fn text(&self, body: &Map<String, Value>) -> Result<Option<String>, ValidationError> {
        let Some(value) = self.lookup(body) else {
            return Ok(None);
        };
        let text = value.as_str().ok_or_else(|| self.wrong_type())?;

        if let Kind::Text { max_length } = self.kind {
            snafu::ensure!(
                text.chars().count() <= max_length,
                TooLongSnafu {
                    field: self.field,
                    max: max_length
                }
            );
        }

        Ok(Some(text.to_owned()))
    }

    fn integer(&self, body: &Map<String, Value>) -> Result<Option<i64>, ValidationError> {
        self.lookup(body)
            .map(|value| value.as_i64().ok_or_else(|| self.wrong_type()))
            .transpose()
    }

    fn required<T>(&self, value: Option<T>) -> Result<T, ValidationError> {
        value.context(MissingFieldSnafu {
            field: self.field,
            help: self.help,
        })
    }
}

/// Parse the body as a JSON object. An empty body is an empty object.
fn object(body: &[u8]) -> Result<Map<String, Value>, ValidationError> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Map::new());
    }

    match serde_json::from_slice::<Value>(body).context(MalformedBodySnafu)? {
        Value::Object(map) => Ok(map),
        _ => NotAnObjectSnafu.fail(),
    }
}

/// Arguments of a PUT request, every field is required.
pub fn create(body: &[u8]) -> Result<NewVideo, ValidationError> {
    let body = object(body)?;

    let name = CREATE_NAME.required(CREATE_NAME.text(&body)?)?;
    let views = CREATE_VIEWS.required(CREATE_VIEWS.integer(&body)?)?;
    let likes = CREATE_LIKES.required(CREATE_LIKES.integer(&body)?)?;

    Ok(NewVideo { name, views, likes })
}

/// Arguments of a PATCH request, every field is optional but must be well typed when present.
pub fn update(body: &[u8]) -> Result<VideoPatch, ValidationError> {
    let body = object(body)?;

    Ok(VideoPatch {
        name: UPDATE_NAME.text(&body)?,
        views: UPDATE_VIEWS.integer(&body)?,
        likes: UPDATE_LIKES.integer(&body)?,
    })
}
