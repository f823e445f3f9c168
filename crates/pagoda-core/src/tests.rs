#[cfg(test)]
mod tests {
    use crate::animation::*;
    use crate::geometry::*;
    use crate::tree::*;
    use std::time::{Duration, Instant};

    #[test]
    fn test_rect_contains() {
        let rect = Rect {
            x: 10.0,
            y: 10.0,
            w: 100.0,
            h: 50.0,
        };

        assert!(rect.contains(Vec2 { x: 50.0, y: 30.0 }));
        assert!(!rect.contains(Vec2 { x: 5.0, y: 30.0 }));
        assert!(!rect.contains(Vec2 { x: 50.0, y: 70.0 }));
    }

    #[test]
    fn test_animation_deterministic() {
        let t0 = Instant::now();
        set_clock(Box::new(TestClock { t: t0 }));

        let mut a = AnimatedValue::new(
            0.0f32,
            AnimationSpec::tween(Duration::from_millis(1000), Easing::Linear),
        );
        a.set_target(10.0);
        // advance 250ms
        set_clock(Box::new(TestClock {
            t: t0 + Duration::from_millis(250),
        }));
        assert!(a.update());
        assert!((*a.get() - 2.5).abs() < 0.01);

        set_clock(Box::new(TestClock {
            t: t0 + Duration::from_millis(1000),
        }));
        let cont = a.update();
        assert!(!cont);
        assert!((*a.get() - 10.0).abs() < 0.001);
    }

    #[test]
    fn test_animation_stop_freezes_value() {
        let t0 = Instant::now();
        set_clock(Box::new(TestClock { t: t0 }));

        let mut a = AnimatedValue::new(0.0f32, AnimationSpec::tween(
            Duration::from_millis(100),
            Easing::Linear,
        ));
        a.set_target(100.0);
        set_clock(Box::new(TestClock {
            t: t0 + Duration::from_millis(40),
        }));
        a.update();
        let mid = *a.get();
        a.stop();

        set_clock(Box::new(TestClock {
            t: t0 + Duration::from_millis(90),
        }));
        assert!(!a.update());
        assert_eq!(*a.get(), mid);
    }

    #[test]
    fn test_paint_state_defaults() {
        let mut arena = Arena::new();
        let title = arena.alloc(NodeKind::Title {
            text: "Inbox".into(),
        });
        let p = arena.paint(title);
        assert_eq!(p.opacity, 1.0);
        assert_eq!(p.scale, 1.0);
        assert_eq!(p.translate_y, 0.0);
    }
}
