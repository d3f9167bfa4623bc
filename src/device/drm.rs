//! Mode planning for direct-rendering (DRM/KMS) output.
//!
//! Multiple connectors may support different resolutions, possibly of
//! different aspect. One dumb framebuffer is shared by all of them: each
//! connector shows a viewport into it, centered, and the drawable canvas is
//! the part visible on every output. The plan is computed as:
//!
//! 1. for each connector, its maximal-resolution mode;
//! 2. the componentwise minimum of those is the canvas size (unless a size
//!    was requested, which replaces steps 1-2);
//! 3. for each connector, the smallest mode covering the canvas;
//! 4. the framebuffer is the componentwise maximum of the step-3 modes;
//! 5. each viewport is centered in the framebuffer.
//!
//! "Maximal" and "minimal" over two dimensions are not unique: the best so
//! far is replaced only by a mode better on both dimensions, while the
//! min/max of steps 2 and 4 apply per component.
//!
//! Programming the modes requires platform ioctls and lives with the
//! platform integration; this module is the testable planning core, plus
//! the saved-state bookkeeping for virtual-terminal switches.

/// A display resolution.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Mode {
    /// Create a mode.
    pub fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Whether this mode covers `other` in both dimensions.
    pub fn covers(&self, other: &Mode) -> bool {
        self.width >= other.width && self.height >= other.height
    }
}

/// A video output and the modes it supports.
#[derive(Debug, Clone)]
pub struct Connector {
    /// Connector identifier.
    pub id: u32,
    /// Supported modes, in the connector's preference order.
    pub modes: Vec<Mode>,
}

/// The mode and viewport chosen for one connector.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ConnectorPlan {
    /// Connector identifier.
    pub id: u32,
    /// The mode to program.
    pub mode: Mode,
    /// Horizontal offset of the viewport in the framebuffer.
    pub x: u32,
    /// Vertical offset of the viewport in the framebuffer.
    pub y: u32,
}

/// The complete output plan.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DrmPlan {
    /// Size of the dumb framebuffer to allocate.
    pub framebuffer: Mode,
    /// Size of the drawable canvas (the area visible on every output),
    /// centered in the framebuffer.
    pub canvas: Mode,
    /// Per-connector modes and viewports.
    pub connectors: Vec<ConnectorPlan>,
}

impl DrmPlan {
    /// Offset of the canvas within the framebuffer.
    pub fn canvas_origin(&self) -> (u32, u32) {
        (
            (self.framebuffer.width - self.canvas.width) / 2,
            (self.framebuffer.height - self.canvas.height) / 2,
        )
    }
}

/// Maximal-resolution mode of a connector: the best so far is replaced only
/// when another mode beats it on both dimensions.
fn maximal_mode(conn: &Connector) -> Option<Mode> {
    let mut best: Option<Mode> = None;
    for m in &conn.modes {
        match best {
            None => best = Some(*m),
            Some(b) if b.width < m.width && b.height < m.height => best = Some(*m),
            _ => {}
        }
    }
    best
}

/// Smallest mode of a connector that covers the given size.
fn minimal_covering_mode(conn: &Connector, cover: Mode) -> Option<Mode> {
    let mut best: Option<Mode> = None;
    for m in &conn.modes {
        if !m.covers(&cover) {
            continue;
        }
        match best {
            None => best = Some(*m),
            Some(b) if b.width > m.width && b.height > m.height => best = Some(*m),
            _ => {}
        }
    }
    best
}

/// Compute the output plan for the enabled connectors.
///
/// With `requested`, the canvas is the requested size and only the covering
/// modes are computed; connectors with no covering mode are left out of the
/// plan (they show nothing and do not constrain the others).
pub fn plan(connectors: &[Connector], requested: Option<Mode>) -> Option<DrmPlan> {
    let usable: Vec<&Connector> = connectors.iter().filter(|c| !c.modes.is_empty()).collect();
    if usable.is_empty() {
        return None;
    }

    let canvas = match requested {
        Some(size) => size,
        None => {
            let mut width = u32::MAX;
            let mut height = u32::MAX;
            for conn in &usable {
                let m = maximal_mode(conn)?;
                width = width.min(m.width);
                height = height.min(m.height);
            }
            Mode::new(width, height)
        }
    };

    let mut chosen = Vec::new();
    let mut fb = Mode::new(0, 0);
    for conn in &usable {
        let Some(mode) = minimal_covering_mode(conn, canvas) else {
            continue;
        };
        fb.width = fb.width.max(mode.width);
        fb.height = fb.height.max(mode.height);
        chosen.push((conn.id, mode));
    }
    if chosen.is_empty() {
        return None;
    }

    let connectors = chosen
        .into_iter()
        .map(|(id, mode)| ConnectorPlan {
            id,
            mode,
            x: (fb.width - mode.width) / 2,
            y: (fb.height - mode.height) / 2,
        })
        .collect();

    Some(DrmPlan {
        framebuffer: fb,
        canvas,
        connectors,
    })
}

/// Controller state saved around virtual-terminal switches.
///
/// On switch-out the prior state (whatever was on screen before the viewer
/// started) must be programmed back; on switch-in the viewer's own plan is
/// re-applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CrtcState {
    /// Connector this state belongs to.
    pub connector: u32,
    /// Framebuffer attached to the controller.
    pub framebuffer: u32,
    /// Mode that was programmed.
    pub mode: Mode,
    /// Viewport offset.
    pub x: u32,
    /// Viewport offset.
    pub y: u32,
}

/// Bookkeeping for VT switches: which state to program on release and on
/// acquire.
#[derive(Debug, Default)]
pub struct SwitchState {
    prior: Vec<CrtcState>,
    own: Vec<CrtcState>,
}

impl SwitchState {
    /// Record the state found at startup and the state the plan programs.
    pub fn new(prior: Vec<CrtcState>, own: Vec<CrtcState>) -> Self {
        Self { prior, own }
    }

    /// The states to program when the VT is released.
    pub fn on_release(&self) -> &[CrtcState] {
        &self.prior
    }

    /// The states to program when the VT is acquired again.
    pub fn on_acquire(&self) -> &[CrtcState] {
        &self.own
    }
}
