use crate::desktop::{SlideBackend, WindowFocus};
use crate::error::Result;
use crate::operator::{CatchUpChoice, Operator};
use crate::types::Workspace;
use std::rc::Rc;

/// Keeps the audience's slide in step with the action being run.
pub struct DisplaySync {
    slides: Box<dyn SlideBackend>,
    focus: Rc<dyn WindowFocus>,
    /// Slide currently shown; 0 until the first jump.
    current: u32,
}

impl DisplaySync {
    pub fn new(slides: Box<dyn SlideBackend>, focus: Rc<dyn WindowFocus>) -> Self {
        Self {
            slides,
            focus,
            current: 0,
        }
    }

    pub fn current(&self) -> u32 {
        self.current
    }

    pub fn goto(&mut self, slide: u32) -> Result<()> {
        self.slides.goto(slide)?;
        self.current = slide;
        self.focus.focus(Workspace::Slides)
    }

    /// Bring the display to `target`. Going back is always a direct jump;
    /// going forward lets an interactive operator walk through the slides in
    /// between.
    pub fn catch_up_to(
        &mut self,
        target: u32,
        interactive: bool,
        operator: &mut dyn Operator,
    ) -> Result<()> {
        if self.current > target {
            return self.goto(target);
        }
        while self.current < target {
            let choice = if interactive {
                operator.catch_up(self.current, target)?
            } else {
                CatchUpChoice::Jump
            };
            match choice {
                CatchUpChoice::Jump => self.goto(target)?,
                CatchUpChoice::Next => self.goto(self.current + 1)?,
                CatchUpChoice::Previous => self.goto(self.current.saturating_sub(1).max(1))?,
                CatchUpChoice::Abort => {
                    tracing::info!(showing = self.current, target, "slide catch-up aborted");
                    return Ok(());
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{RecordingFocus, RecordingSlides, ScriptedOperator};

    fn sync() -> (DisplaySync, RecordingSlides, RecordingFocus) {
        let slides = RecordingSlides::default();
        let focus = RecordingFocus::default();
        let display = DisplaySync::new(Box::new(slides.clone()), Rc::new(focus.clone()));
        (display, slides, focus)
    }

    #[test]
    fn goto_tracks_and_refocuses() {
        let (mut display, slides, focus) = sync();
        display.goto(4).unwrap();
        assert_eq!(display.current(), 4);
        assert_eq!(*slides.gotos.borrow(), vec![4]);
        assert_eq!(*focus.focused.borrow(), vec![Workspace::Slides]);
    }

    #[test]
    fn catching_up_backwards_jumps_directly() {
        let (mut display, slides, _) = sync();
        display.goto(8).unwrap();
        let mut op = ScriptedOperator::default();
        display.catch_up_to(5, true, &mut op).unwrap();
        assert_eq!(*slides.gotos.borrow(), vec![8, 5]);
        assert_eq!(display.current(), 5);
    }

    #[test]
    fn non_interactive_jumps_on_first_iteration() {
        let (mut display, slides, _) = sync();
        let mut op = ScriptedOperator::default();
        display.catch_up_to(6, false, &mut op).unwrap();
        assert_eq!(*slides.gotos.borrow(), vec![6]);
    }

    #[test]
    fn interactive_steps_until_caught_up() {
        let (mut display, slides, _) = sync();
        display.goto(2).unwrap();
        let mut op = ScriptedOperator::default().with_choices([
            CatchUpChoice::Next,
            CatchUpChoice::Next,
            CatchUpChoice::Previous,
            CatchUpChoice::Jump,
        ]);
        display.catch_up_to(5, true, &mut op).unwrap();
        assert_eq!(*slides.gotos.borrow(), vec![2, 3, 4, 3, 5]);
    }

    #[test]
    fn abort_leaves_display_behind() {
        let (mut display, slides, _) = sync();
        let mut op = ScriptedOperator::default().with_choices([
            CatchUpChoice::Next,
            CatchUpChoice::Abort,
        ]);
        display.catch_up_to(5, true, &mut op).unwrap();
        assert_eq!(display.current(), 1);
        assert_eq!(*slides.gotos.borrow(), vec![1]);
    }

    #[test]
    fn already_there_does_nothing() {
        let (mut display, slides, _) = sync();
        display.goto(3).unwrap();
        let mut op = ScriptedOperator::default();
        display.catch_up_to(3, true, &mut op).unwrap();
        assert_eq!(*slides.gotos.borrow(), vec![3]);
    }
}
