//! Center panel display pipeline.
//!
//! Data flows one way: producers -> [`DisplayBuffer`] (via the manager) ->
//! [`DisplayTiming`] -> [`RenderStateManager`] gate -> [`DisplayRenderer`] ->
//! [`PaintTarget`], with the painting itself posted to the UI inbox.

mod batch;
mod buffer;
mod chunk;
mod filter;
mod inbox;
mod manager;
mod mode;
mod paint;
pub mod recording;
mod render_state;
mod renderer;
mod timing;

pub use batch::DisplayBatchTransaction;
pub use buffer::{BufferOptions, DisplayBuffer, ScrollMode, ScrollState};
pub use chunk::{ChunkStrategy, RevealConfig, split_into_chunks};
pub use filter::{AllowAll, MessageFilter};
pub use inbox::{PaintJob, UiReceiver, UiSender, ui_inbox};
pub use manager::{
    CenterPanelDisplayManager, ExternalRender, PanelGeometry, PanelOptions, PanelStats,
    ScrollMetrics,
};
pub use mode::{DisplayMode, GameContext, ModeKind, ModeSettings, ModesConfig};
pub use paint::{PaintTarget, wrapped_line_count};
pub use recording::RecordingCanvas;
pub use render_state::{RenderSnapshot, RenderState, RenderStateManager};
pub use renderer::{Area, COMBAT_TITLE, DisplayRenderer, RenderOutcome, resolve_title};
pub use timing::{DisplayTiming, RenderAction};
