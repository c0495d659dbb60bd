use std::io::{self, Write};

use crossterm::cursor::MoveTo;
use crossterm::style::{Color, Print, ResetColor, SetForegroundColor};
use crossterm::terminal::{Clear, ClearType};
use crossterm::QueueableCommand;
use unicode_width::UnicodeWidthStr;

use crate::components::{Point, Pos};
use crate::ghost::{GhostKind, GhostState};
use crate::level::Tile;
use crate::session::{Outcome, Session, SessionState};

const CELL_W: usize = 2;
const MESSAGE_ROWS: usize = 4;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Glyph {
    Player,
    PlayerShrinking,
    Ghost(GhostKind),
    Frightened,
    Wall,
    Empty,
    Pellet,
    Power,
}

impl Glyph {
    fn color(self) -> Color {
        match self {
            Glyph::Player | Glyph::PlayerShrinking => Color::Yellow,
            Glyph::Ghost(GhostKind::Blinky) => Color::Red,
            Glyph::Ghost(GhostKind::Pinky) => Color::Magenta,
            Glyph::Ghost(GhostKind::Inky) => Color::Cyan,
            Glyph::Ghost(GhostKind::Clyde) => Color::DarkYellow,
            Glyph::Frightened | Glyph::Wall => Color::Blue,
            Glyph::Empty => Color::Reset,
            Glyph::Pellet => Color::White,
            Glyph::Power => Color::Magenta,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Tone {
    Normal,
    Accent,
    Alert,
}

impl Tone {
    fn color(self) -> Color {
        match self {
            Tone::Normal => Color::White,
            Tone::Accent => Color::Yellow,
            Tone::Alert => Color::Red,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextSlot {
    Hud,
    Message,
}

/// Where a session gets drawn.
pub trait Surface {
    fn put_tile(&mut self, pos: Pos, glyph: Glyph);
    fn put_text(&mut self, slot: TextSlot, text: &str, tone: Tone);
}

/// Which characters stand in for each glyph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum GlyphSet {
    #[default]
    Emoji,
    Ascii,
}

impl GlyphSet {
    pub fn parse(name: &str) -> Option<GlyphSet> {
        match name.trim().to_ascii_lowercase().as_str() {
            "emoji" => Some(GlyphSet::Emoji),
            "ascii" => Some(GlyphSet::Ascii),
            _ => None,
        }
    }

    pub fn text(self, glyph: Glyph) -> &'static str {
        match self {
            GlyphSet::Emoji => match glyph {
                Glyph::Player => "😃",
                Glyph::PlayerShrinking => "😵",
                Glyph::Ghost(_) => "👻",
                Glyph::Frightened => "😱",
                Glyph::Wall => "██",
                Glyph::Empty => "  ",
                Glyph::Pellet => "· ",
                Glyph::Power => "● ",
            },
            GlyphSet::Ascii => match glyph {
                Glyph::Player => "C ",
                Glyph::PlayerShrinking => "c ",
                Glyph::Ghost(_) => "M ",
                Glyph::Frightened => "W ",
                Glyph::Wall => "##",
                Glyph::Empty => "  ",
                Glyph::Pellet => ". ",
                Glyph::Power => "o ",
            },
        }
    }
}

/// Off-screen picture of one frame.
#[derive(Debug, Clone, PartialEq)]
pub struct Frame {
    width: usize,
    height: usize,
    cells: Vec<Glyph>,
    hud: String,
    messages: Vec<(String, Tone)>,
}

impl Frame {
    pub fn new(width: usize, height: usize) -> Self {
        Self {
            width,
            height,
            cells: vec![Glyph::Empty; width * height],
            hud: String::new(),
            messages: Vec::new(),
        }
    }

    pub fn glyph(&self, pos: Pos) -> Option<Glyph> {
        if pos.x >= self.width || pos.y >= self.height {
            return None;
        }
        self.cells.get(pos.y * self.width + pos.x).copied()
    }

    pub fn hud(&self) -> &str {
        &self.hud
    }

    pub fn messages(&self) -> impl Iterator<Item = &str> {
        self.messages.iter().map(|(text, _)| text.as_str())
    }
}

impl Surface for Frame {
    fn put_tile(&mut self, pos: Pos, glyph: Glyph) {
        if pos.x < self.width && pos.y < self.height {
            self.cells[pos.y * self.width + pos.x] = glyph;
        }
    }

    fn put_text(&mut self, slot: TextSlot, text: &str, tone: Tone) {
        match slot {
            TextSlot::Hud => self.hud = text.to_string(),
            TextSlot::Message => self.messages.push((text.to_string(), tone)),
        }
    }
}

pub fn draw_session(session: &Session, surface: &mut impl Surface) {
    let maze = session.maze();
    for y in 0..maze.height() {
        for x in 0..maze.width() {
            let pos = Pos::new(x, y);
            let glyph = match maze.tile(pos) {
                Some(Tile::Wall) => Glyph::Wall,
                Some(Tile::Pellet) => Glyph::Pellet,
                Some(Tile::PowerPellet) => Glyph::Power,
                Some(Tile::Path) | None => Glyph::Empty,
            };
            surface.put_tile(pos, glyph);
        }
    }

    let player = session.player();
    let state = session.state();
    if !matches!(state, SessionState::GameOver(_)) {
        for ghost in session.ghosts() {
            let glyph = match ghost.state() {
                GhostState::Frightened => Glyph::Frightened,
                _ => Glyph::Ghost(ghost.kind()),
            };
            put_actor(surface, ghost.center(), glyph);
        }
        let glyph = if player.is_dead() {
            Glyph::PlayerShrinking
        } else {
            Glyph::Player
        };
        put_actor(surface, player.center(), glyph);
    }

    let hud = format!(
        "Score: {}  Lives: {}  Pellets: {}  Power: {}  (q to quit)",
        player.score(),
        player.lives(),
        maze.remaining_collectibles(),
        if player.is_powered_up() { "ON" } else { "off" }
    );
    surface.put_text(TextSlot::Hud, &hud, Tone::Normal);

    match state {
        SessionState::Intro => {
            surface.put_text(TextSlot::Message, "PAC-MAN", Tone::Accent);
            surface.put_text(
                TextSlot::Message,
                "Arrows/hjkl move  P pause  R restart  Q/Esc quit",
                Tone::Normal,
            );
            surface.put_text(TextSlot::Message, "Press Enter to start", Tone::Normal);
        }
        SessionState::PlayerDead => {
            surface.put_text(TextSlot::Message, "Caught!", Tone::Alert);
            surface.put_text(
                TextSlot::Message,
                &format!("Lives left: {}", player.lives()),
                Tone::Normal,
            );
            surface.put_text(TextSlot::Message, "Press Enter to continue", Tone::Normal);
        }
        SessionState::GameOver(outcome) => {
            let (title, tone) = match outcome {
                Outcome::Won => ("YOU WIN!", Tone::Accent),
                Outcome::Lost => ("GAME OVER", Tone::Alert),
            };
            surface.put_text(TextSlot::Message, title, tone);
            surface.put_text(
                TextSlot::Message,
                &format!("Final score: {}", player.score()),
                Tone::Normal,
            );
            surface.put_text(TextSlot::Message, "Press R to restart or Q to quit", Tone::Normal);
        }
        SessionState::Playing => {}
    }
    if session.is_paused() {
        surface.put_text(TextSlot::Message, "PAUSED (p to resume)", Tone::Accent);
    }
}

fn put_actor(surface: &mut impl Surface, center: Point, glyph: Glyph) {
    if let Some(pos) = center.tile() {
        surface.put_tile(pos, glyph);
    }
}

/// Draws frames to a terminal, rewriting only the cells that changed.
pub struct TerminalRenderer {
    glyphs: GlyphSet,
    last: Vec<Glyph>,
    last_hud: String,
    needs_full: bool,
    origin_x: u16,
    origin_y: u16,
}

impl TerminalRenderer {
    pub fn new(glyphs: GlyphSet) -> Self {
        Self {
            glyphs,
            last: Vec::new(),
            last_hud: String::new(),
            needs_full: true,
            origin_x: 0,
            origin_y: 1,
        }
    }

    pub fn render(
        &mut self,
        out: &mut impl Write,
        frame: &Frame,
        (term_w, term_h): (u16, u16),
    ) -> io::Result<()> {
        let needed_w = (frame.width * CELL_W) as u16;
        let needed_h = (frame.height + 1 + MESSAGE_ROWS) as u16;

        out.queue(MoveTo(0, 0))?;
        if term_w < needed_w || term_h < needed_h {
            out.queue(Clear(ClearType::All))?;
            out.queue(Print(format!(
                "Terminal too small. Need at least {}x{} (cols x rows). Current: {}x{}.",
                needed_w, needed_h, term_w, term_h
            )))?;
            out.flush()?;
            self.needs_full = true;
            return Ok(());
        }

        let origin_x = (term_w - needed_w) / 2;
        let origin_y = (term_h - needed_h) / 2 + 1;
        if origin_x != self.origin_x || origin_y != self.origin_y {
            self.origin_x = origin_x;
            self.origin_y = origin_y;
            self.needs_full = true;
        }
        if self.last.len() != frame.cells.len() {
            self.last = vec![Glyph::Empty; frame.cells.len()];
            self.needs_full = true;
        }
        if self.needs_full {
            out.queue(Clear(ClearType::All))?;
        }

        if self.needs_full || frame.hud != self.last_hud {
            out.queue(MoveTo(self.origin_x, self.origin_y - 1))?;
            out.queue(SetForegroundColor(Tone::Normal.color()))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            out.queue(Print(&frame.hud))?;
            out.queue(ResetColor)?;
            self.last_hud = frame.hud.clone();
        }

        for y in 0..frame.height {
            for x in 0..frame.width {
                let idx = y * frame.width + x;
                let glyph = frame.cells[idx];
                if self.needs_full || glyph != self.last[idx] {
                    self.last[idx] = glyph;
                    self.draw_cell(out, x, y, glyph)?;
                }
            }
        }
        self.needs_full = false;

        let first_row = self.origin_y + frame.height as u16;
        for row in 0..MESSAGE_ROWS {
            out.queue(MoveTo(0, first_row + row as u16))?;
            out.queue(Clear(ClearType::CurrentLine))?;
            if let Some((text, tone)) = frame.messages.get(row) {
                let w = UnicodeWidthStr::width(text.as_str()) as u16;
                let x = self.origin_x + needed_w.saturating_sub(w) / 2;
                out.queue(MoveTo(x, first_row + row as u16))?;
                out.queue(SetForegroundColor(tone.color()))?;
                out.queue(Print(text))?;
                out.queue(ResetColor)?;
            }
        }

        out.flush()
    }

    fn draw_cell(&self, out: &mut impl Write, x: usize, y: usize, glyph: Glyph) -> io::Result<()> {
        let text = self.glyphs.text(glyph);
        out.queue(MoveTo(
            self.origin_x + (x * CELL_W) as u16,
            self.origin_y + y as u16,
        ))?;
        out.queue(SetForegroundColor(glyph.color()))?;
        out.queue(Print(text))?;
        let w = UnicodeWidthStr::width(text);
        for _ in w..CELL_W {
            out.queue(Print(' '))?;
        }
        out.queue(ResetColor)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use rand::rngs::StdRng;
    use rand::SeedableRng;

    use super::*;
    use crate::components::Dir;
    use crate::ghost::Ghost;
    use crate::level::Maze;
    use crate::session::Command;

    fn lone_player() -> Session {
        let maze = Maze::from_rows(&["#######", "#..o..#", "#######"]).unwrap();
        Session::with_maze(
            maze,
            Pos::new(1, 1),
            Duration::from_millis(100),
            StdRng::seed_from_u64(3),
        )
    }

    fn session() -> Session {
        lone_player().with_ghosts(vec![Ghost::new(
            GhostKind::Pinky,
            Pos::new(5, 1),
            Duration::ZERO,
        )])
    }

    fn frame_of(session: &Session) -> Frame {
        let mut frame = Frame::new(session.maze().width(), session.maze().height());
        draw_session(session, &mut frame);
        frame
    }

    #[test]
    fn glyph_sets_parse_by_name() {
        assert_eq!(GlyphSet::parse("emoji"), Some(GlyphSet::Emoji));
        assert_eq!(GlyphSet::parse(" ASCII "), Some(GlyphSet::Ascii));
        assert_eq!(GlyphSet::parse("sprites"), None);
    }

    #[test]
    fn every_glyph_fills_its_cell() {
        let glyphs = [
            Glyph::Player,
            Glyph::PlayerShrinking,
            Glyph::Ghost(GhostKind::Inky),
            Glyph::Frightened,
            Glyph::Wall,
            Glyph::Empty,
            Glyph::Pellet,
            Glyph::Power,
        ];
        for set in [GlyphSet::Emoji, GlyphSet::Ascii] {
            for glyph in glyphs {
                assert_eq!(UnicodeWidthStr::width(set.text(glyph)), CELL_W, "{glyph:?}");
            }
        }
    }

    #[test]
    fn intro_shows_maze_actors_and_prompt() {
        let s = session();
        let frame = frame_of(&s);
        assert_eq!(frame.glyph(Pos::new(0, 0)), Some(Glyph::Wall));
        assert_eq!(frame.glyph(Pos::new(1, 1)), Some(Glyph::Player));
        assert_eq!(frame.glyph(Pos::new(3, 1)), Some(Glyph::Power));
        assert_eq!(frame.glyph(Pos::new(5, 1)), Some(Glyph::Ghost(GhostKind::Pinky)));
        assert!(frame.hud().contains("Lives: 3"));
        assert!(frame.messages().any(|m| m.contains("Enter")));
        assert!(frame.messages().any(|m| m.contains("P pause") && m.contains("Esc quit")));
    }

    #[test]
    fn death_screen_counts_remaining_lives() {
        let mut s = lone_player().with_ghosts(vec![Ghost::new(
            GhostKind::Blinky,
            Pos::new(1, 1),
            Duration::ZERO,
        )]);
        s.handle(Command::Confirm);
        s.tick();
        assert_eq!(s.state(), SessionState::PlayerDead);
        let frame = frame_of(&s);
        let messages: Vec<&str> = frame.messages().collect();
        assert_eq!(messages[0], "Caught!");
        assert!(messages.contains(&"Lives left: 2"));
    }

    #[test]
    fn pause_and_game_over_messages() {
        let mut s = lone_player();
        s.handle(Command::Confirm);
        s.handle(Command::TogglePause);
        assert!(frame_of(&s).messages().any(|m| m.starts_with("PAUSED")));

        s.handle(Command::TogglePause);
        s.handle(Command::Press(Dir::Right));
        for _ in 0..200 {
            s.tick();
            if matches!(s.state(), SessionState::GameOver(_)) {
                break;
            }
        }
        let frame = frame_of(&s);
        let messages: Vec<&str> = frame.messages().collect();
        assert_eq!(messages[0], "YOU WIN!");
        assert!(messages.iter().any(|m| m.starts_with("Final score")));
    }

    #[test]
    fn tiny_terminal_gets_a_placeholder() {
        let frame = frame_of(&session());
        let mut renderer = TerminalRenderer::new(GlyphSet::Ascii);
        let mut out = Vec::new();
        renderer.render(&mut out, &frame, (4, 2)).unwrap();
        let text = String::from_utf8_lossy(&out);
        assert!(text.contains("Terminal too small"));
    }

    #[test]
    fn unchanged_cells_are_not_redrawn() {
        let frame = frame_of(&session());
        let mut renderer = TerminalRenderer::new(GlyphSet::Ascii);
        let mut first = Vec::new();
        renderer.render(&mut first, &frame, (80, 24)).unwrap();
        assert!(String::from_utf8_lossy(&first).contains("##"));

        let mut second = Vec::new();
        renderer.render(&mut second, &frame, (80, 24)).unwrap();
        assert!(second.len() < first.len());
        assert!(!String::from_utf8_lossy(&second).contains("##"));
    }
}
