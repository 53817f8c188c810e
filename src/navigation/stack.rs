use serde::Serialize;

use crate::routing::Params;
use crate::screen::Screen;

/// One entry in the navigation stack.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Frame {
    pub route: String,
    pub params: Params,
    pub screen: Screen,
}

/// The stack mutation a navigation operation asked for.
#[derive(Serialize, Debug, Clone, Copy, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum StackOp {
    Push,
    ReplaceTop,
    ResetTo,
    Pop,
}

/// A mutation ready to apply: the operation plus its materialized frame.
#[derive(Debug)]
pub enum Transition {
    Push(Frame),
    ReplaceTop(Frame),
    ResetTo(Frame),
    Pop,
}

impl Transition {
    pub fn op(&self) -> StackOp {
        match self {
            Transition::Push(_) => StackOp::Push,
            Transition::ReplaceTop(_) => StackOp::ReplaceTop,
            Transition::ResetTo(_) => StackOp::ResetTo,
            Transition::Pop => StackOp::Pop,
        }
    }
}

/// Ordered screen history. Index 0 is the root; the stack is never empty.
#[derive(Debug)]
pub struct NavigationStack {
    frames: Vec<Frame>,
}

impl NavigationStack {
    pub fn new(root: Frame) -> Self {
        Self { frames: vec![root] }
    }

    pub fn top(&self) -> &Frame {
        // frames always holds the root
        &self.frames[self.frames.len() - 1]
    }

    /// The frame a `Pop` would reveal, if any.
    pub fn below_top(&self) -> Option<&Frame> {
        self.frames.len().checked_sub(2).map(|i| &self.frames[i])
    }

    pub fn len(&self) -> usize {
        self.frames.len()
    }

    pub fn routes(&self) -> Vec<String> {
        self.frames.iter().map(|f| f.route.clone()).collect()
    }

    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    pub fn apply(&mut self, transition: Transition) {
        match transition {
            Transition::Push(frame) => self.frames.push(frame),
            Transition::ReplaceTop(frame) => {
                let top = self.frames.len() - 1;
                self.frames[top] = frame;
            }
            Transition::ResetTo(frame) => {
                self.frames.clear();
                self.frames.push(frame);
            }
            Transition::Pop => {
                if self.frames.len() > 1 {
                    self.frames.pop();
                }
            }
        }
    }
}
