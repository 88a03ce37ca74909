//! Cascading dropdown configurator.
//!
//! A chain of dependent selection [`Frame`]s. Choosing an option in frame
//! `i` discards every deeper frame and, when frame `i` says what comes
//! next, fetches the dependent option set from an [`OptionSource`]. A
//! non-empty answer becomes frame `i + 1`; an empty one completes the chain.
//!
//! The backend drives the shape of the chain through a cursor in every
//! options response:
//!
//! ```json
//! {
//!   "options": [{"id": "eu-west-1", "name": "Ireland"}],
//!   "next": {"path": "/deployment-options/clusters", "params": {"region": "id"}},
//!   "metadata": {"label": "Region"}
//! }
//! ```
//!
//! `params` maps each query parameter of the next request to a field of the
//! option the user picked. Dotted names reach into nested objects. When the
//! option is a bare string or number, every parameter takes its value.

use std::collections::BTreeMap;
use std::future::Future;

use serde::{Deserialize, Serialize};
use serde_json::Value;
use skydeck_core::Signal;
use skydeck_core::logging::targets;
use skydeck_net::NetworkError;

/// Errors raised by the configurator.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum CascadeError {
    /// No frame at that index.
    #[error("frame index {index} is out of range ({len} frames)")]
    FrameOutOfRange { index: usize, len: usize },

    /// The option is not one of the frame's options.
    #[error("option is not offered by frame {index}")]
    NotOffered { index: usize },

    /// The selected option lacks a field the next request needs.
    #[error("selected option has no field '{field}' for query parameter '{param}'")]
    MissingField { param: String, field: String },

    /// Fetching the next option set failed.
    #[error(transparent)]
    Fetch(#[from] NetworkError),
}

/// Where the next option set comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NextDescriptor {
    /// Backend path, relative to the API base URL.
    pub path: String,
    /// Query parameter name -> field of the selected option.
    #[serde(default)]
    pub params: BTreeMap<String, String>,
}

/// A backend answer listing the options of one frame.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct OptionsResponse {
    #[serde(default)]
    pub options: Vec<Value>,
    #[serde(default)]
    pub next: Option<NextDescriptor>,
    #[serde(default)]
    pub metadata: Option<Value>,
}

/// Supplies option sets to a [`CascadeConfigurator`].
pub trait OptionSource: Send + Sync {
    /// Fetch the options at `path` with the given query parameters.
    fn fetch_options(
        &self,
        path: &str,
        query: Vec<(String, String)>,
    ) -> impl Future<Output = skydeck_net::Result<OptionsResponse>> + Send;
}

// ============================================================================
// Frame
// ============================================================================

/// One level of the selection chain.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Frame {
    pub options: Vec<Value>,
    pub selected: Option<Value>,
    pub next: Option<NextDescriptor>,
    pub metadata: Option<Value>,
}

impl Frame {
    /// Frame built from an options response, with nothing selected.
    pub fn from_response(response: OptionsResponse) -> Self {
        Self {
            options: response.options,
            selected: None,
            next: response.next,
            metadata: response.metadata,
        }
    }

    /// Display labels for the options.
    ///
    /// Uses `label`, then `name`, then `id` of object options; scalars are
    /// shown as-is.
    pub fn labels(&self) -> Vec<String> {
        self.options.iter().map(option_label).collect()
    }
}

/// Human-readable label of an option.
pub fn option_label(option: &Value) -> String {
    match option {
        Value::Object(map) => ["label", "name", "id"]
            .iter()
            .find_map(|k| map.get(*k).and_then(scalar_text))
            .unwrap_or_else(|| option.to_string()),
        other => scalar_text(other).unwrap_or_default(),
    }
}

fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Null => None,
        Value::Array(_) | Value::Object(_) => Some(value.to_string()),
    }
}

/// Build the query for `next` from the fields of `option`.
pub fn build_query(
    next: &NextDescriptor,
    option: &Value,
) -> Result<Vec<(String, String)>, CascadeError> {
    next.params
        .iter()
        .map(|(param, field)| {
            let value = match option {
                Value::Object(_) => field
                    .split('.')
                    .try_fold(option, |v, key| v.get(key))
                    .and_then(scalar_text),
                scalar => scalar_text(scalar),
            };
            value
                .map(|v| (param.clone(), v))
                .ok_or_else(|| CascadeError::MissingField {
                    param: param.clone(),
                    field: field.clone(),
                })
        })
        .collect()
}

// ============================================================================
// CascadeConfigurator
// ============================================================================

/// What a selection did to the chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectOutcome {
    /// A new frame was appended.
    Appended,
    /// No further options; the chain is complete.
    Complete,
}

/// State of a cascading selection chain.
///
/// # Signals
///
/// - `changed(())`: the frame list, a selection or the completion flag changed
pub struct CascadeConfigurator<S: OptionSource> {
    source: S,
    frames: Vec<Frame>,
    complete: bool,
    final_metadata: Option<Value>,
    last_error: Option<NetworkError>,

    /// Emitted after every mutation of the chain.
    pub changed: Signal<()>,
}

impl<S: OptionSource> CascadeConfigurator<S> {
    /// Create an empty chain; call [`load_root`](Self::load_root) next.
    pub fn new(source: S) -> Self {
        Self {
            source,
            frames: Vec::new(),
            complete: false,
            final_metadata: None,
            last_error: None,
            changed: Signal::new(),
        }
    }

    /// Create a chain whose first frame is already known.
    pub fn with_root(source: S, root: Frame) -> Self {
        let mut this = Self::new(source);
        this.frames.push(root);
        this
    }

    /// The option source.
    pub fn source(&self) -> &S {
        &self.source
    }

    /// Frames, outermost first.
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Frame at `index`.
    pub fn frame(&self, index: usize) -> Option<&Frame> {
        self.frames.get(index)
    }

    /// Whether the chain reached a point with no further options.
    pub fn is_complete(&self) -> bool {
        self.complete
    }

    /// The error of the last failed fetch, cleared by the next selection.
    pub fn last_error(&self) -> Option<&NetworkError> {
        self.last_error.as_ref()
    }

    /// Selected options in frame order, up to the first unselected frame.
    pub fn selections(&self) -> Vec<Value> {
        self.frames
            .iter()
            .map_while(|f| f.selected.clone())
            .collect()
    }

    /// Metadata describing the finished chain.
    ///
    /// Taken from the terminating response when it carried any, else from
    /// the deepest frame.
    pub fn final_metadata(&self) -> Option<&Value> {
        if !self.complete {
            return None;
        }
        self.final_metadata
            .as_ref()
            .or_else(|| self.frames.last().and_then(|f| f.metadata.as_ref()))
    }

    /// Fetch frame 0 from `path`, replacing the whole chain.
    ///
    /// On failure the chain is left as it was.
    pub async fn load_root(&mut self, path: &str) -> Result<(), CascadeError> {
        tracing::debug!(target: targets::CASCADE, path, "loading root options");
        match self.source.fetch_options(path, Vec::new()).await {
            Ok(response) => {
                self.frames = vec![Frame::from_response(response)];
                self.complete = false;
                self.final_metadata = None;
                self.last_error = None;
                self.changed.emit(());
                Ok(())
            }
            Err(err) => {
                tracing::warn!(target: targets::CASCADE, path, "failed to load root options: {err}");
                self.last_error = Some(err.clone());
                self.changed.emit(());
                Err(err.into())
            }
        }
    }

    /// Select `option` in frame `frame_index`.
    ///
    /// Deeper frames are always discarded, even when `option` equals the
    /// previous selection. If the frame has a `next` descriptor, the next
    /// option set is fetched; otherwise the chain completes. A failed fetch
    /// leaves the chain truncated at `frame_index + 1` with the error in
    /// [`last_error`](Self::last_error); selecting again retries.
    ///
    /// `option` must be one of the frame's options; anything else is
    /// rejected with [`CascadeError::NotOffered`] and the chain is untouched.
    pub async fn select_option(
        &mut self,
        frame_index: usize,
        option: Value,
    ) -> Result<SelectOutcome, CascadeError> {
        let Some(frame) = self.frames.get(frame_index) else {
            return Err(CascadeError::FrameOutOfRange {
                index: frame_index,
                len: self.frames.len(),
            });
        };

        if !frame.options.contains(&option) {
            return Err(CascadeError::NotOffered { index: frame_index });
        }

        // Resolve the next request before touching state.
        let request = match &frame.next {
            Some(next) => Some((next.path.clone(), build_query(next, &option)?)),
            None => None,
        };

        self.frames.truncate(frame_index + 1);
        self.frames[frame_index].selected = Some(option);
        self.complete = false;
        self.final_metadata = None;
        self.last_error = None;
        tracing::debug!(target: targets::CASCADE, frame_index, "option selected");

        let Some((path, query)) = request else {
            self.complete = true;
            self.changed.emit(());
            return Ok(SelectOutcome::Complete);
        };
        self.changed.emit(());

        match self.source.fetch_options(&path, query).await {
            Ok(response) if response.options.is_empty() => {
                tracing::debug!(target: targets::CASCADE, depth = self.frames.len(), "chain complete");
                self.complete = true;
                self.final_metadata = response.metadata;
                self.changed.emit(());
                Ok(SelectOutcome::Complete)
            }
            Ok(response) => {
                self.frames.push(Frame::from_response(response));
                self.changed.emit(());
                Ok(SelectOutcome::Appended)
            }
            Err(err) => {
                tracing::warn!(target: targets::CASCADE, path = %path, "failed to fetch next options: {err}");
                self.last_error = Some(err.clone());
                self.changed.emit(());
                Err(err.into())
            }
        }
    }

    /// Drop every frame after the root and clear the selection and error.
    pub fn reset(&mut self) {
        self.frames.truncate(1);
        if let Some(root) = self.frames.first_mut() {
            root.selected = None;
        }
        self.complete = false;
        self.final_metadata = None;
        self.last_error = None;
        self.changed.emit(());
    }
}

impl<S: OptionSource> std::fmt::Debug for CascadeConfigurator<S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CascadeConfigurator")
            .field("frames", &self.frames)
            .field("complete", &self.complete)
            .field("last_error", &self.last_error)
            .finish()
    }
}
