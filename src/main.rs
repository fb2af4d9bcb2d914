use anyhow::Result;
use clap::Parser;
use crossterm::event::{
    self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind, MouseButton,
    MouseEvent, MouseEventKind,
};
use crossterm::execute;
use flood_map::app::{App, InputMode};
use flood_map::risk::RiskCategory;
use flood_map::ui;
use ratatui::DefaultTerminal;
use std::path::PathBuf;
use std::time::Duration;

/// Interactive flood risk choropleth map in the terminal.
#[derive(Parser)]
#[command(name = "flood-map", version, about)]
struct Args {
    /// Path to the flood risk GeoJSON dataset
    #[arg(long, default_value = "flood_risk_data.geojson")]
    data: PathBuf,
}

fn main() -> Result<()> {
    let args = Args::parse();

    // Initialize terminal
    let mut terminal = ratatui::init();
    terminal.clear()?;

    // Enable mouse capture
    execute!(std::io::stdout(), EnableMouseCapture)?;

    // Run the app
    let result = run(&mut terminal, args.data);

    // Disable mouse capture and restore terminal
    let _ = execute!(std::io::stdout(), DisableMouseCapture);
    ratatui::restore();

    result
}

fn run(terminal: &mut DefaultTerminal, data_path: PathBuf) -> Result<()> {
    let size = terminal.size()?;
    let mut app = App::new(size.width as usize, size.height as usize, data_path);
    app.load();

    // Main loop
    loop {
        // Draw
        terminal.draw(|frame| ui::render(frame, &app))?;

        // Handle events with ~60fps target
        if event::poll(Duration::from_millis(16))? {
            match event::read()? {
                Event::Key(key) => {
                    // Only handle key press events (not release)
                    if key.kind == KeyEventKind::Press {
                        handle_key(&mut app, key.code);
                    }
                }
                Event::Mouse(mouse) => {
                    handle_mouse(&mut app, mouse);
                }
                Event::Resize(width, height) => {
                    app.resize(width as usize, height as usize);
                }
                _ => {}
            }
        }

        // Advance counters and hover state
        app.tick();

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

fn handle_key(app: &mut App, code: KeyCode) {
    // A blocking notice swallows the dismissing key press.
    if app.dismiss_notice() {
        return;
    }

    // The search prompt captures text input until Enter or Esc.
    if app.input_mode == InputMode::Search {
        match code {
            KeyCode::Enter => app.submit_search(),
            KeyCode::Esc => app.cancel_search(),
            KeyCode::Backspace => app.search_backspace(),
            KeyCode::Char(c) => app.search_input(c),
            _ => {}
        }
        return;
    }

    match code {
        KeyCode::Char('q') => app.quit(),
        KeyCode::Esc => {
            // Esc closes the popup first, then quits.
            if app.popup.is_some() {
                app.close_popup();
            } else {
                app.quit();
            }
        }

        // Pan with hjkl or arrow keys
        KeyCode::Left | KeyCode::Char('h') => app.pan(-10, 0),
        KeyCode::Right | KeyCode::Char('l') => app.pan(10, 0),
        KeyCode::Up | KeyCode::Char('k') => app.pan(0, -6),
        KeyCode::Down | KeyCode::Char('j') => app.pan(0, 6),

        // Zoom
        KeyCode::Char('+') | KeyCode::Char('=') => app.zoom_in(),
        KeyCode::Char('-') | KeyCode::Char('_') => app.zoom_out(),

        // Risk filters
        KeyCode::Char('1') => app.toggle_filter(RiskCategory::High),
        KeyCode::Char('2') => app.toggle_filter(RiskCategory::Medium),
        KeyCode::Char('3') => app.toggle_filter(RiskCategory::Low),

        // Search prompt
        KeyCode::Char('/') => app.open_search(),

        // Legend and side panel
        KeyCode::Char('g') | KeyCode::Char('G') => app.toggle_legend(),
        KeyCode::Char('p') | KeyCode::Char('P') => app.toggle_panel(),

        // Reload the dataset and reset the view
        KeyCode::Char('r') | KeyCode::Char('0') => app.reload(),

        _ => {}
    }
}

/// Handle mouse events for hovering, panning, zooming, and click-to-focus.
fn handle_mouse(app: &mut App, mouse: MouseEvent) {
    // Always track mouse position for the cursor marker and hover state
    app.set_mouse_pos(mouse.column, mouse.row);

    match mouse.kind {
        // Scroll wheel for zooming towards mouse position
        MouseEventKind::ScrollUp => app.zoom_in_at(mouse.column, mouse.row),
        MouseEventKind::ScrollDown => app.zoom_out_at(mouse.column, mouse.row),
        // Horizontal scroll for panning (trackpad two-finger swipe)
        MouseEventKind::ScrollLeft => app.pan(-15, 0),
        MouseEventKind::ScrollRight => app.pan(15, 0),
        // Press, drag to pan, release; a motionless press is a click
        MouseEventKind::Down(MouseButton::Left) => {
            app.begin_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Drag(MouseButton::Left) => {
            app.handle_drag(mouse.column, mouse.row);
        }
        MouseEventKind::Up(MouseButton::Left) => {
            app.end_drag(mouse.column, mouse.row);
        }
        _ => {}
    }
}
