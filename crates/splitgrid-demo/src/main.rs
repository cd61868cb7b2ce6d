// ABOUTME: Demo binary that drives a splitview, a grid and a pane stack through a typical session.
// ABOUTME: Lays panels out, drags a sash, serializes and restores, logging geometry.

use std::path::PathBuf;

use anyhow::Result;
use splitgrid_core::{LayoutOptions, Parameters};
use splitgrid_layout::{
    ComponentRegistry, Direction, GridviewComponent, PaneOptions, PaneviewComponent,
    PanelConstraints, PanelContent, PanelId, PanelOptions, Position, SerializedGridview,
    SerializedPaneview, SerializedSplitview, Sizing, SplitviewComponent,
};
use tracing_subscriber::EnvFilter;

/// Panel content that only reports what happens to it
#[derive(Default)]
struct Placeholder {
    title: String,
}

impl PanelContent for Placeholder {
    fn init(&mut self, params: &Parameters) {
        self.title = params
            .get("title")
            .and_then(|v| v.as_str())
            .unwrap_or("untitled")
            .to_string();
    }

    fn layout(&mut self, width: f64, height: f64) {
        tracing::debug!("{} laid out at {:.0}x{:.0}", self.title, width, height);
    }

    fn focus(&mut self) {
        tracing::info!("{} focused", self.title);
    }
}

fn registry() -> ComponentRegistry {
    let mut registry = ComponentRegistry::new();
    registry.register("default", || -> Box<dyn PanelContent> {
        Box::new(Placeholder::default())
    });
    registry
}

fn panel(id: &str) -> PanelOptions {
    PanelOptions::new(id, "default")
        .with_params(Parameters::new().with("title", format!("Panel {}", id)))
        .with_constraints(PanelConstraints::uniform(50.0, None))
}

fn log_sizes(label: &str, splitview: &SplitviewComponent) {
    let sizes: Vec<String> = splitview.sizes().iter().map(|s| format!("{:.1}", s)).collect();
    tracing::info!("{}: [{}]", label, sizes.join(", "));
}

fn log_rects(label: &str, grid: &GridviewComponent) {
    let mut rects: Vec<_> = grid.panel_rects().into_iter().collect();
    rects.sort_by(|a, b| a.0.cmp(&b.0));
    for (id, rect) in rects {
        tracing::info!(
            "{}: {} at ({:.0}, {:.0}) {:.0}x{:.0}",
            label,
            id,
            rect.x,
            rect.y,
            rect.width,
            rect.height
        );
    }
}

fn splitview_session(options: LayoutOptions) -> Result<()> {
    let mut splitview = SplitviewComponent::new(options, registry());
    splitview.layout(600.0, 200.0);
    for id in ["1", "2", "3"] {
        splitview.add_panel(panel(id), None, Sizing::Distribute)?;
    }
    log_sizes("Initial", &splitview);

    splitview.begin_drag(0, 200.0)?;
    for position in [220.0, 260.0, 300.0, 420.0] {
        let applied = splitview.drag_to(position);
        splitview.flush_frame();
        tracing::debug!("Drag to {} applied {:.1}", position, applied);
    }
    splitview.end_drag();
    log_sizes("After drag", &splitview);

    let json = splitview.to_json().to_json_string()?;
    tracing::info!("Serialized splitview:\n{}", json);

    let mut restored = SplitviewComponent::new(options, registry());
    restored.from_json(&SerializedSplitview::from_json_str(&json)?)?;
    log_sizes("Restored", &restored);

    restored.remove_panel(&PanelId::from("2"), Sizing::Distribute)?;
    log_sizes("Removed panel 2", &restored);
    Ok(())
}

fn grid_session(options: LayoutOptions) -> Result<()> {
    let mut grid = GridviewComponent::new(options, registry());
    let _subscription = grid
        .on_grid_event()
        .subscribe(|event| tracing::info!("Grid event: {:?}", event));

    grid.layout(800.0, 600.0);
    grid.add_panel(panel("editor"), None, Sizing::Distribute)?;
    grid.add_panel(
        panel("sidebar"),
        Some(Position::Relative {
            reference: PanelId::from("editor"),
            direction: Direction::Left,
        }),
        Sizing::Size(200.0),
    )?;
    grid.add_panel(
        panel("terminal"),
        Some(Position::Relative {
            reference: PanelId::from("editor"),
            direction: Direction::Below,
        }),
        Sizing::Distribute,
    )?;
    log_rects("Grid", &grid);

    grid.move_panel(
        &PanelId::from("terminal"),
        &PanelId::from("sidebar"),
        Direction::Below,
        Sizing::Distribute,
    )?;
    grid.toggle_visibility(&PanelId::from("sidebar"))?;
    log_rects("Moved terminal, hid sidebar", &grid);

    let data = grid.to_json();
    let json = data.to_json_string()?;
    let mut restored = GridviewComponent::new(options, registry());
    restored.from_json(&SerializedGridview::from_json_str(&json)?)?;
    restored.container_resized(1024.0, 768.0);
    log_rects("Restored and resized", &restored);
    restored.focus();
    Ok(())
}

fn pane_session(options: LayoutOptions) -> Result<()> {
    let mut sidebar = PaneviewComponent::new(options, registry());
    let _ = sidebar.layout(250.0, 500.0);
    for id in ["explorer", "outline", "timeline"] {
        sidebar.add_panel(PaneOptions::from_panel(panel(id)), None, Sizing::Distribute)?;
    }
    sidebar.set_expanded(&PanelId::from("outline"), false)?.check()?;
    sidebar.toggle_expanded(&PanelId::from("timeline"))?;
    tracing::info!("Panes after collapsing: {:?}", sidebar.sizes());

    let json = sidebar.to_json().to_json_string()?;
    let mut restored = PaneviewComponent::new(options, registry());
    restored.from_json(&SerializedPaneview::from_json_str(&json)?)?;
    restored.toggle_expanded(&PanelId::from("outline"))?;
    tracing::info!("Restored panes, outline expanded: {:?}", restored.sizes());
    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let options = match std::env::args().nth(1) {
        Some(path) => LayoutOptions::load(&PathBuf::from(path))?,
        None => LayoutOptions::default(),
    };
    tracing::info!("Starting splitgrid demo with {:?}", options);

    splitview_session(options)?;
    grid_session(options)?;
    pane_session(options)?;
    Ok(())
}
