use crate::config::{self, Config};
use crate::events::{AppEvent, InputEvent};
use crate::sys::runtime;
use async_channel::{Receiver, Sender};
use rotary::dial::{ActionKind, DialLayout, DialNumber};
use rotary::events::{Effects, ShellEvent, Timer};
use rotary::gaze::{GazeFrame, GazeOffsetMapper};
use rotary::geometry::{BoundingBox, Point};
use rotary::gesture::DialGestureEngine;
use std::io::Write;
use std::path::Path;

/// Headless stand-in for the page: owns the dial engine and the portrait
/// mapper, and remembers the last layout reported by the renderer.
pub struct Switchboard {
    pub engine: DialGestureEngine,
    pub gaze: GazeOffsetMapper,
    pub layout: DialLayout,
    pub dial_box: Option<BoundingBox>,
    pub portrait_box: Option<BoundingBox>,
    last_gaze: Option<GazeFrame>,
}

impl Switchboard {
    pub fn new(config: &Config) -> Self {
        let dials = config.dial_table().unwrap_or_else(|e| {
            log::error!("Invalid dial table, using defaults: {}", e);
            Config::default().dial_table().unwrap_or_default()
        });

        Self {
            engine: DialGestureEngine::new(dials, config.timing()),
            gaze: config.gaze_mapper(),
            layout: config.layout,
            dial_box: None,
            portrait_box: None,
            last_gaze: None,
        }
    }

    pub fn apply_config(&mut self, config: &Config) {
        match config.dial_table() {
            Ok(dials) => self.engine.set_dials(dials),
            Err(e) => log::error!("Keeping previous dial table: {}", e),
        }
        self.engine.set_timing(config.timing());
        self.gaze = config.gaze_mapper();
        self.layout = config.layout;
    }

    pub fn handle(&mut self, input: InputEvent) -> Effects {
        match input {
            InputEvent::Layout { dial, portrait } => {
                if dial.is_some() {
                    self.dial_box = dial;
                }
                if portrait.is_some() {
                    self.portrait_box = portrait;
                }
                Effects::default()
            }
            InputEvent::Press { dial, x, y } => {
                let pointer = Point::new(x, y);
                match self.resolve_dial(dial, pointer) {
                    Some(number) => {
                        self.engine
                            .press_start(number, self.dial_box.as_ref(), pointer)
                    }
                    None => {
                        log::warn!("Press at ({}, {}) did not land on a dial hole", x, y);
                        Effects::default()
                    }
                }
            }
            InputEvent::Move { x, y } => {
                let pointer = Point::new(x, y);
                let mut fx = self.engine.pointer_move(self.dial_box.as_ref(), pointer);
                if let Some(event) = self.track_gaze(pointer) {
                    fx.push(event);
                }
                fx
            }
            InputEvent::Up => self.engine.pointer_up(),
            InputEvent::PopupClosed => self.engine.popup_closed(),
        }
    }

    pub fn fire(&mut self, timer: Timer) -> Effects {
        self.engine.fire(timer)
    }

    fn resolve_dial(&self, number: Option<u8>, pointer: Point) -> Option<DialNumber> {
        match number {
            Some(n) => (n as usize)
                .checked_sub(1)
                .and_then(DialNumber::from_index),
            None => self
                .dial_box
                .as_ref()
                .and_then(|b| self.layout.hit_test(b, pointer)),
        }
    }

    fn track_gaze(&mut self, pointer: Point) -> Option<ShellEvent> {
        let portrait = self.portrait_box.as_ref()?;
        let frame = self.gaze.frame(portrait, self.gaze.map(portrait, pointer));
        if self.last_gaze == Some(frame) {
            return None;
        }
        self.last_gaze = Some(frame);
        Some(ShellEvent::GazeChanged(frame))
    }

    /// Logs what a page would do with a completed dial.
    fn announce(&self, event: &ShellEvent) {
        let ShellEvent::DialCompleted { dial, .. } = event else {
            return;
        };

        match &self.engine.dials().get(*dial).action {
            Some(action) if action.kind == ActionKind::Link => match &action.href {
                Some(href) => log::info!("Dial {} opens {}", dial, href),
                None => log::warn!("Dial {} is a link without an href", dial),
            },
            Some(action) => log::info!("Dial {} opens the {} popup", dial, action.kind),
            None => log::info!("Dial {} has no signal", dial),
        }
    }
}

fn emit<W: Write>(out: &mut W, events: &[ShellEvent]) -> anyhow::Result<()> {
    for event in events {
        serde_json::to_writer(&mut *out, event)?;
        writeln!(out)?;
    }
    out.flush()?;
    Ok(())
}

/// Serial event loop. Runs until input is exhausted and no timer is pending.
pub async fn run<W: Write>(
    mut board: Switchboard,
    tx: Sender<AppEvent>,
    rx: Receiver<AppEvent>,
    config_path: &Path,
    out: &mut W,
) -> anyhow::Result<()> {
    let mut pending = 0usize;
    let mut input_open = true;

    while let Ok(event) = rx.recv().await {
        let fx = match event {
            AppEvent::Input(input) => board.handle(input),
            AppEvent::Timer(timer) => {
                pending = pending.saturating_sub(1);
                board.fire(timer)
            }
            AppEvent::InputClosed => {
                log::debug!("Input closed, {} timer(s) pending", pending);
                input_open = false;
                Effects::default()
            }
            AppEvent::ConfigReload => {
                match config::load_config(config_path) {
                    Ok(new_config) => {
                        board.apply_config(&new_config);
                        log::info!("Configuration reloaded");
                    }
                    Err(e) => log::error!("Failed to reload config: {}", e),
                }
                Effects::default()
            }
        };

        for event in &fx.events {
            board.announce(event);
        }
        emit(out, &fx.events)?;

        pending += fx.timers.len();
        for request in fx.timers {
            runtime::schedule(tx.clone(), request);
        }

        if !input_open && pending == 0 {
            break;
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{DialConfig, TimingConfig};
    use rotary::dial::ActionTag;
    use rotary::events::Status;
    use rotary::gaze::{EyeAnchor, Gaze};
    use serde_json::Value;
    use std::time::Duration;

    fn board() -> Switchboard {
        let mut board = Switchboard::new(&Config::default());
        board.handle(InputEvent::Layout {
            dial: Some(BoundingBox::new(0.0, 0.0, 400.0, 400.0)),
            portrait: Some(BoundingBox::new(500.0, 0.0, 700.0, 700.0)),
        });
        board
    }

    #[test]
    fn test_press_by_hit_test() {
        let mut board = board();
        let hole = board
            .layout
            .hole_center(DialNumber::Two, board.dial_box.as_ref().unwrap());

        let fx = board.handle(InputEvent::Press {
            dial: None,
            x: hole.x,
            y: hole.y,
        });

        assert_eq!(board.engine.session().unwrap().dial, DialNumber::Two);
        assert_eq!(
            fx.events,
            vec![ShellEvent::StatusChanged {
                status: Status::Holding("GITHUB".into())
            }]
        );
    }

    #[test]
    fn test_press_outside_holes_is_ignored() {
        let mut board = board();
        let fx = board.handle(InputEvent::Press {
            dial: None,
            x: 200.0,
            y: 200.0,
        });
        assert!(fx.is_empty());

        let fx = board.handle(InputEvent::Press {
            dial: Some(0),
            x: 200.0,
            y: 200.0,
        });
        assert!(fx.is_empty());
        assert!(board.engine.session().is_none());
    }

    #[test]
    fn test_move_reports_gaze_only_on_change() {
        let mut board = board();

        let fx = board.handle(InputEvent::Move { x: 0.0, y: 100.0 });
        let frame = fx
            .events
            .iter()
            .find_map(|e| match e {
                ShellEvent::GazeChanged(f) => Some(*f),
                _ => None,
            })
            .unwrap();
        assert!(frame.left.offset.dx < 0.0);
        let portrait = board.portrait_box.unwrap();
        assert_eq!(
            frame.left.origin,
            EyeAnchor::LEFT.iris_origin(&portrait, frame.left.offset)
        );

        let fx = board.handle(InputEvent::Move { x: 0.0, y: 100.0 });
        assert!(fx.is_empty());

        // below the portrait: eyes return forward once
        let fx = board.handle(InputEvent::Move { x: 0.0, y: 900.0 });
        let forward = board.gaze.frame(&portrait, Gaze::FORWARD);
        assert_eq!(fx.events, vec![ShellEvent::GazeChanged(forward)]);
        let fx = board.handle(InputEvent::Move { x: 0.0, y: 950.0 });
        assert!(fx.is_empty());
    }

    fn blog_dial(number: DialNumber) -> DialConfig {
        DialConfig {
            number,
            label: "BLOG".to_string(),
            tag: Some(ActionTag::new("blog-link")),
            kind: None,
            href: Some("https://example.com".to_string()),
        }
    }

    fn release_after_drag(board: &mut Switchboard, dial: u8) -> Effects {
        board.handle(InputEvent::Press {
            dial: Some(dial),
            x: 300.0,
            y: 200.0,
        });
        // 70 degrees: short of hole 1's stop, past the release threshold
        board.handle(InputEvent::Move {
            x: 200.0 + 100.0 * 70f64.to_radians().cos(),
            y: 200.0 + 100.0 * 70f64.to_radians().sin(),
        });
        board.handle(InputEvent::Up)
    }

    #[test]
    fn test_apply_config_swaps_table_timing_layout_and_eyes() {
        let mut board = board();
        let config = Config {
            dials: vec![blog_dial(DialNumber::Nine)],
            timing: TimingConfig {
                settle_delay_ms: 50,
                status_display_ms: 200,
            },
            layout: DialLayout {
                orbit_radius: 100.0,
                hole_radius: 10.0,
            },
            eyes: crate::config::EyesConfig {
                left: EyeAnchor::RIGHT,
                right: EyeAnchor::RIGHT,
            },
        };

        board.apply_config(&config);

        assert_eq!(board.engine.dials().get(DialNumber::Nine).display_name(), "BLOG");
        assert!(board.engine.dials().get(DialNumber::One).action.is_none());
        assert_eq!(board.layout.orbit_radius, 100.0);
        assert_eq!(board.gaze.left, EyeAnchor::RIGHT);

        let fx = release_after_drag(&mut board, 9);
        assert_eq!(fx.timers.len(), 1);
        assert_eq!(fx.timers[0].delay, Duration::from_millis(50));

        let fx = board.fire(fx.timers[0].timer);
        assert_eq!(fx.completions().count(), 1);
        assert_eq!(fx.timers[0].delay, Duration::from_millis(200));
    }

    #[test]
    fn test_apply_config_keeps_table_on_duplicate_hole() {
        let mut board = board();
        let config = Config {
            dials: vec![blog_dial(DialNumber::One), blog_dial(DialNumber::One)],
            timing: TimingConfig {
                settle_delay_ms: 50,
                status_display_ms: 1000,
            },
            ..Config::default()
        };

        board.apply_config(&config);

        let email = board.engine.dials().get(DialNumber::One);
        assert_eq!(email.display_name(), "EMAIL");
        assert_eq!(email.action_tag(), Some(&ActionTag::new("email")));
        assert_eq!(board.engine.dials().assigned().count(), 4);

        // timing is still swapped
        let fx = release_after_drag(&mut board, 1);
        assert_eq!(fx.timers[0].delay, Duration::from_millis(50));
    }

    #[tokio::test(start_paused = true)]
    async fn test_trace_completes_after_settle_delay() {
        let (tx, rx) = async_channel::unbounded();
        let script = vec![
            InputEvent::Layout {
                dial: Some(BoundingBox::new(0.0, 0.0, 400.0, 400.0)),
                portrait: None,
            },
            InputEvent::Press {
                dial: Some(2),
                x: 300.0,
                y: 200.0,
            },
            // 115 degrees around from due right
            InputEvent::Move {
                x: 200.0 + 100.0 * 115f64.to_radians().cos(),
                y: 200.0 + 100.0 * 115f64.to_radians().sin(),
            },
        ];
        for input in script {
            tx.send(AppEvent::Input(input)).await.unwrap();
        }
        tx.send(AppEvent::InputClosed).await.unwrap();

        let start = tokio::time::Instant::now();
        let mut out = Vec::new();
        run(
            Switchboard::new(&Config::default()),
            tx,
            rx,
            Path::new("/nonexistent/switchboard.toml"),
            &mut out,
        )
        .await
        .unwrap();
        assert!(start.elapsed() >= rotary::gesture::SETTLE_DELAY);

        let lines: Vec<Value> = String::from_utf8(out)
            .unwrap()
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();
        let kinds: Vec<&str> = lines.iter().map(|l| l["event"].as_str().unwrap()).collect();

        assert_eq!(kinds, vec!["status", "status", "dial_completed", "status"]);
        assert_eq!(lines[0]["status"], "HOLDING GITHUB...");
        assert_eq!(lines[1]["status"], "CONNECTING...");
        assert_eq!(lines[2]["index"], 1);
        assert_eq!(lines[2]["action"], "github-link");
        assert_eq!(lines[3]["status"], "SECURE LINE // IDLE");
    }
}
