#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Vec2 {
    pub x: f32,
    pub y: f32,
}

impl Vec2 {
    pub fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Size {
    pub width: f32,
    pub height: f32,
}

impl Size {
    pub fn new(width: f32, height: f32) -> Self {
        Self { width, height }
    }

    /// Negative or NaN dimensions collapse to zero instead of poisoning
    /// downstream arithmetic.
    pub fn sanitized(self) -> Self {
        fn clean(v: f32) -> f32 {
            if v.is_finite() { v.max(0.0) } else { 0.0 }
        }
        Self {
            width: clean(self.width),
            height: clean(self.height),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
}

impl Rect {
    pub fn contains(&self, p: Vec2) -> bool {
        p.x >= self.x && p.x <= self.x + self.w && p.y >= self.y && p.y <= self.y + self.h
    }
}

/// A length that is either absolute or a fraction of the available extent.
///
/// Nav-bar width constraints and the minimum content width accept both forms.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Length {
    Px(f32),
    Percent(f32),
}

impl Length {
    pub fn resolve(&self, available: f32) -> f32 {
        let v = match self {
            Length::Px(px) => *px,
            Length::Percent(p) => available * p / 100.0,
        };
        if v.is_finite() { v.max(0.0) } else { 0.0 }
    }
}

impl Default for Length {
    fn default() -> Self {
        Length::Px(0.0)
    }
}

/// Parent-imposed bounds for one measure pass.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Constraint {
    pub max: Size,
}

impl Constraint {
    pub fn new(width: f32, height: f32) -> Self {
        Self {
            max: Size::new(width, height).sanitized(),
        }
    }

    /// Validating constructor for command-style callers; `new` clamps
    /// silently instead.
    pub fn checked(width: f32, height: f32) -> Result<Self, crate::error::LayoutError> {
        if width.is_finite() && height.is_finite() && width >= 0.0 && height >= 0.0 {
            Ok(Self::new(width, height))
        } else {
            Err(crate::error::LayoutError::InvalidConstraint)
        }
    }

    pub fn shrink_height(&self, by: f32) -> Self {
        Self {
            max: Size::new(self.max.width, (self.max.height - by).max(0.0)),
        }
    }

    pub fn shrink_width(&self, by: f32) -> Self {
        Self {
            max: Size::new((self.max.width - by).max(0.0), self.max.height),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn length_resolution() {
        assert_eq!(Length::Px(240.0).resolve(1000.0), 240.0);
        assert_eq!(Length::Percent(40.0).resolve(500.0), 200.0);
        assert_eq!(Length::Px(-5.0).resolve(100.0), 0.0);
        assert_eq!(Length::Px(f32::NAN).resolve(100.0), 0.0);
    }

    #[test]
    fn sanitize_bad_sizes() {
        let s = Size::new(f32::NAN, -3.0).sanitized();
        assert_eq!(s, Size::new(0.0, 0.0));
    }

    #[test]
    fn constraint_shrink_saturates() {
        let c = Constraint::new(300.0, 100.0);
        assert_eq!(c.shrink_height(250.0).max.height, 0.0);
        assert_eq!(c.shrink_width(50.0).max.width, 250.0);
    }

    #[test]
    fn checked_constraint_rejects_bad_dimensions() {
        use crate::error::LayoutError;
        assert!(Constraint::checked(100.0, 50.0).is_ok());
        assert_eq!(
            Constraint::checked(f32::NAN, 50.0),
            Err(LayoutError::InvalidConstraint)
        );
        assert_eq!(
            Constraint::checked(100.0, -1.0),
            Err(LayoutError::InvalidConstraint)
        );
    }
}
