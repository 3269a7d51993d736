/// Terminal host for the scene engine: raw-mode crossterm surface, keyboard
/// input and an ASCII rasterizer backend
use crossterm::{
    cursor,
    event::{
        self, Event, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute, queue,
    style::{Color, Print, ResetColor, SetForegroundColor},
    terminal::{self, ClearType},
};
use scene3d_core::{frame, EngineConfig, InputState, KeyEvent, Renderer, RenderPath, Scene, WindowHost};
use std::io::{self, stdout, Write};
use std::time::{Duration, Instant};

pub mod keys;
pub mod renderer;

pub use renderer::{AsciiRenderer, CELL_ASPECT};

const CONTROLS: &str = "Arrows=Rotate WASD/QE=Move Tab=Target Esc=Quit";

/// A raw-mode terminal in the alternate screen. Restored on drop.
pub struct TerminalHost {
    width: u16,
    height: u16,
    title: String,
    should_close: bool,
    enhanced_keyboard: bool,
    frame_time: Duration,
    frame_start: Instant,
    last_fps_update: Instant,
    frame_count: u32,
    fps: f32,
}

impl TerminalHost {
    pub fn new(target_fps: u32) -> io::Result<Self> {
        let (width, height) = terminal::size()?;

        terminal::enable_raw_mode()?;
        execute!(stdout(), terminal::EnterAlternateScreen, cursor::Hide)?;

        // Release events need the keyboard enhancement protocol; Windows
        // consoles report them natively
        let enhanced_keyboard = cfg!(windows)
            || matches!(terminal::supports_keyboard_enhancement(), Ok(true));
        if enhanced_keyboard && !cfg!(windows) {
            execute!(
                stdout(),
                PushKeyboardEnhancementFlags(
                    KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES
                        | KeyboardEnhancementFlags::REPORT_EVENT_TYPES
                )
            )?;
        }
        tracing::info!(width, height, enhanced_keyboard, "terminal ready");

        let now = Instant::now();
        Ok(Self {
            width,
            height,
            title: String::new(),
            should_close: false,
            enhanced_keyboard,
            frame_time: Duration::from_millis(1000 / u64::from(target_fps.max(1))),
            frame_start: now,
            last_fps_update: now,
            frame_count: 0,
            fps: 0.0,
        })
    }
}

impl WindowHost for TerminalHost {
    fn size(&self) -> (u32, u32) {
        (u32::from(self.width), u32::from(self.height))
    }

    fn poll_events(&mut self) -> io::Result<Vec<KeyEvent>> {
        let mut events = Vec::new();
        while event::poll(Duration::from_millis(0))? {
            match event::read()? {
                Event::Key(key) => events.push(keys::map_key_event(&key)),
                Event::Resize(width, height) => {
                    self.width = width;
                    self.height = height;
                    queue!(stdout(), terminal::Clear(ClearType::All))?;
                }
                _ => {}
            }
        }
        Ok(events)
    }

    fn reports_key_release(&self) -> bool {
        self.enhanced_keyboard
    }

    fn set_title(&mut self, title: &str) {
        title.clone_into(&mut self.title);
    }

    fn present(&mut self) -> io::Result<()> {
        let mut stdout = stdout();
        queue!(
            stdout,
            cursor::MoveTo(0, 0),
            SetForegroundColor(Color::Yellow),
            Print(format!(
                "Scene3D | {} | FPS: {:.1} | {}",
                self.title, self.fps, CONTROLS
            )),
            ResetColor
        )?;
        stdout.flush()?;

        // Frame timing
        self.frame_count += 1;
        let elapsed = self.frame_start.elapsed();
        if elapsed < self.frame_time {
            std::thread::sleep(self.frame_time - elapsed);
        }

        // Update FPS counter
        let now = Instant::now();
        if (now - self.last_fps_update).as_secs() >= 1 {
            self.fps = self.frame_count as f32 / (now - self.last_fps_update).as_secs_f32();
            self.frame_count = 0;
            self.last_fps_update = now;
        }
        self.frame_start = now;

        Ok(())
    }

    fn should_close(&self) -> bool {
        self.should_close
    }

    fn set_should_close(&mut self, close: bool) {
        self.should_close = close;
    }
}

impl Drop for TerminalHost {
    fn drop(&mut self) {
        let mut stdout = stdout();
        if self.enhanced_keyboard && !cfg!(windows) {
            let _ = execute!(stdout, PopKeyboardEnhancementFlags);
        }
        let _ = execute!(stdout, terminal::LeaveAlternateScreen, cursor::Show);
        let _ = terminal::disable_raw_mode();
    }
}

/// Main application struct for terminal 3D rendering
pub struct TerminalApp {
    scene: Scene,
    config: EngineConfig,
    target_fps: u32,
}

impl TerminalApp {
    pub fn new(scene: Scene, config: EngineConfig, target_fps: u32) -> Self {
        Self {
            scene,
            config,
            target_fps,
        }
    }

    pub fn scene(&self) -> &Scene {
        &self.scene
    }

    /// Take over the terminal and run until the user quits
    pub fn run(&mut self) -> io::Result<()> {
        let mut host = TerminalHost::new(self.target_fps)?;
        let (width, height) = host.size();

        let depth_test = self.config.render_path != RenderPath::Painter;
        let mut backend = AsciiRenderer::new(width as usize, height as usize, depth_test, stdout());
        let renderer = Renderer::new(self.config.render_path, self.config.ortho);
        let mut input = InputState::new(
            self.scene.entity_count(),
            self.config.linear_step,
            self.config.angular_step,
        );

        frame::run(&mut host, &mut backend, &renderer, &mut self.scene, &mut input)
    }
}
