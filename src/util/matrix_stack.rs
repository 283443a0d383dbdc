//! Stack of accumulated transforms for walking a joint hierarchy.
//!
//! Every entry holds the product of all the matrices pushed so far, so the
//! top is always the full root-to-here transform and popping just drops the
//! last entry. The bottom entry is the identity and can't be popped.

use cgmath::{Matrix4, One};
use smallvec::SmallVec;

pub struct MatrixStack {
    stack: SmallVec<[Matrix4<f64>; 16]>,
}

impl MatrixStack {
    pub fn new() -> MatrixStack {
        let mut stack = SmallVec::new();
        stack.push(Matrix4::one());
        MatrixStack { stack }
    }

    /// Multiply `m` onto the accumulated transform (on the right).
    pub fn push(&mut self, m: Matrix4<f64>) {
        let top = self.top() * m;
        self.stack.push(top);
    }

    /// The accumulated transform, ie. the product of everything pushed so far
    /// in push order.
    pub fn top(&self) -> Matrix4<f64> {
        self.stack[self.stack.len() - 1]
    }

    /// Undo the most recent push. Returns false if there was nothing to pop.
    pub fn pop(&mut self) -> bool {
        if self.stack.len() == 1 {
            return false;
        }
        self.stack.pop();
        true
    }

    #[allow(dead_code)]
    pub fn clear(&mut self) {
        self.stack.truncate(1);
    }

    /// Number of contributions currently pushed.
    pub fn depth(&self) -> usize {
        self.stack.len() - 1
    }

    /// Push `m`, run `f`, then pop again.
    pub fn with_pushed<F, R>(&mut self, m: Matrix4<f64>, f: F) -> R
    where F: FnOnce(&mut MatrixStack) -> R {
        self.push(m);
        let res = f(self);
        self.pop();
        res
    }
}

#[cfg(test)]
use util::approx::mat_approx_eq;
#[cfg(test)]
use cgmath::vec3;

#[test]
fn test_push_accumulates_in_order() {
    let a = Matrix4::from_translation(vec3(1.0, 0.0, 0.0));
    let b = Matrix4::from_nonuniform_scale(2.0, 2.0, 2.0);
    let mut s = MatrixStack::new();
    s.push(a);
    s.push(b);
    assert_eq!(s.depth(), 2);
    assert!(mat_approx_eq(&s.top(), &(a * b)));
    assert!(s.pop());
    assert!(mat_approx_eq(&s.top(), &a));
    assert!(s.pop());
    assert!(mat_approx_eq(&s.top(), &Matrix4::one()));
    assert!(!s.pop());
}

#[test]
fn test_clear() {
    let mut s = MatrixStack::new();
    s.push(Matrix4::from_scale(3.0));
    s.push(Matrix4::from_scale(3.0));
    s.clear();
    assert_eq!(s.depth(), 0);
    assert!(mat_approx_eq(&s.top(), &Matrix4::one()));
}

#[test]
fn test_with_pushed_is_balanced() {
    let mut s = MatrixStack::new();
    let t = Matrix4::from_translation(vec3(0.0, 0.0, 1.0));
    let inner = s.with_pushed(t, |s| {
        s.with_pushed(t, |s| {
            assert_eq!(s.depth(), 2);
            s.top()
        })
    });
    assert!(mat_approx_eq(&inner, &Matrix4::from_translation(vec3(0.0, 0.0, 2.0))));
    assert_eq!(s.depth(), 0);
}
