use std::{
    io::{self, stdout, Stdout, Write},
    ops::{Deref, DerefMut},
};

use crossterm::{
    cursor::Show,
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};

use ratatui::{self, backend::CrosstermBackend, TerminalOptions, Viewport};

type TerminalBackend<W> = ratatui::Terminal<CrosstermBackend<W>>;

/// Raw-mode terminal that draws either inline below the prompt or on the
/// alternate screen. The tty is restored when the value is dropped.
pub struct Terminal<W: Write> {
    inner: TerminalBackend<W>,
    fullscreen: bool,
    inline_height: u16,
}

impl Terminal<Stdout> {
    pub fn new(fullscreen: bool, inline_height: u16) -> io::Result<Self> {
        enable_raw_mode()?;
        let inner = match open(fullscreen, inline_height) {
            Ok(inner) => inner,
            Err(err) => {
                let _ = disable_raw_mode();
                return Err(err);
            }
        };

        Ok(Self {
            inner,
            fullscreen,
            inline_height,
        })
    }

    pub fn is_fullscreen(&self) -> bool {
        self.fullscreen
    }

    /// Moves the drawing area between the alternate screen and the inline
    /// viewport.
    pub fn set_fullscreen(&mut self, fullscreen: bool) -> io::Result<()> {
        if fullscreen == self.fullscreen {
            return Ok(());
        }

        if self.fullscreen {
            execute!(self.inner.backend_mut(), LeaveAlternateScreen)?;
        } else {
            self.inner.clear()?;
        }

        self.inner = open(fullscreen, self.inline_height)?;
        self.fullscreen = fullscreen;
        Ok(())
    }
}

fn open(fullscreen: bool, inline_height: u16) -> io::Result<TerminalBackend<Stdout>> {
    let mut stdout = stdout();
    if fullscreen {
        execute!(stdout, EnterAlternateScreen)?;
        ratatui::Terminal::new(CrosstermBackend::new(stdout))
    } else {
        ratatui::Terminal::with_options(
            CrosstermBackend::new(stdout),
            TerminalOptions {
                viewport: Viewport::Inline(inline_height),
            },
        )
    }
}

impl<W: Write> Deref for Terminal<W> {
    type Target = TerminalBackend<W>;

    fn deref(&self) -> &Self::Target {
        &self.inner
    }
}

impl<W: Write> DerefMut for Terminal<W> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.inner
    }
}

impl<W: Write> Drop for Terminal<W> {
    fn drop(&mut self) {
        if let Err(err) = restore_terminal(self.inner.backend_mut(), self.fullscreen) {
            log::warn!("failed to restore terminal: {err}");
        }
    }
}

fn restore_terminal<W: Write>(out: &mut W, fullscreen: bool) -> io::Result<()> {
    if fullscreen {
        execute!(out, LeaveAlternateScreen)?;
    }
    execute!(out, Show)?;
    disable_raw_mode()?;
    Ok(())
}
