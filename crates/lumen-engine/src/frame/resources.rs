/// What `FrameResources::ensure` did.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum FrameResourceEvent {
    Created { width: u32, height: u32 },
    Resized { width: u32, height: u32 },
}

/// Window-sized target set, created lazily and recreated on exact size
/// mismatch. No hysteresis: any change in either dimension recreates.
#[derive(Debug)]
pub struct FrameResources<T> {
    targets: Option<T>,
    size: (u32, u32),
    recreations: u64,
}

impl<T> Default for FrameResources<T> {
    fn default() -> Self {
        Self {
            targets: None,
            size: (0, 0),
            recreations: 0,
        }
    }
}

impl<T> FrameResources<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Size of the current targets; `(0, 0)` before first creation.
    pub fn size(&self) -> (u32, u32) {
        self.size
    }

    pub fn targets(&self) -> Option<&T> {
        self.targets.as_ref()
    }

    pub fn targets_mut(&mut self) -> Option<&mut T> {
        self.targets.as_mut()
    }

    /// Number of successful creations, the first one included.
    pub fn recreations(&self) -> u64 {
        self.recreations
    }

    /// Makes sure targets exist at `size`. Returns `None` when nothing changed.
    ///
    /// The old targets are released before `create` runs so both sets are
    /// never alive at once. On failure the set is left empty and the next call
    /// retries.
    pub fn ensure<E>(
        &mut self,
        size: (u32, u32),
        create: impl FnOnce(u32, u32) -> Result<T, E>,
    ) -> Result<Option<FrameResourceEvent>, E> {
        if self.targets.is_some() && self.size == size {
            return Ok(None);
        }

        let existed = self.targets.take().is_some();
        self.size = (0, 0);

        let (width, height) = size;
        let targets = create(width, height)?;
        self.targets = Some(targets);
        self.size = size;
        self.recreations += 1;

        Ok(Some(if existed {
            FrameResourceEvent::Resized { width, height }
        } else {
            FrameResourceEvent::Created { width, height }
        }))
    }

    /// Drops the targets. The next `ensure` reports `Created`.
    pub fn release(&mut self) -> Option<T> {
        self.size = (0, 0);
        self.targets.take()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make(w: u32, h: u32) -> Result<(u32, u32), String> {
        Ok((w, h))
    }

    #[test]
    fn created_once_then_only_on_change() {
        let mut res = FrameResources::new();
        assert_eq!(
            res.ensure((800, 600), make),
            Ok(Some(FrameResourceEvent::Created { width: 800, height: 600 }))
        );
        assert_eq!(res.ensure((800, 600), make), Ok(None));
        assert_eq!(
            res.ensure((800, 601), make),
            Ok(Some(FrameResourceEvent::Resized { width: 800, height: 601 }))
        );
        assert_eq!(res.recreations(), 2);
        assert_eq!(res.targets(), Some(&(800, 601)));
    }

    #[test]
    fn size_tracks_every_resize_sequence() {
        let sizes = [(640, 480), (640, 480), (1024, 768), (1024, 768), (640, 480), (1, 1), (1, 1)];
        let mut res = FrameResources::new();
        let mut distinct_changes = 0;
        let mut prev = None;
        for size in sizes {
            res.ensure(size, make).unwrap();
            assert_eq!(res.size(), size);
            if prev != Some(size) {
                distinct_changes += 1;
            }
            prev = Some(size);
        }
        assert_eq!(res.recreations(), distinct_changes);
    }

    #[test]
    fn failure_leaves_set_empty_and_retries() {
        let mut res = FrameResources::new();
        res.ensure((10, 10), make).unwrap();

        let err = res.ensure((20, 20), |_, _| Err::<(u32, u32), _>("oom".to_string()));
        assert_eq!(err, Err("oom".to_string()));
        assert!(res.targets().is_none());
        assert_eq!(res.size(), (0, 0));

        assert_eq!(
            res.ensure((20, 20), make),
            Ok(Some(FrameResourceEvent::Created { width: 20, height: 20 }))
        );
    }

    #[test]
    fn release_forces_creation() {
        let mut res = FrameResources::new();
        res.ensure((5, 5), make).unwrap();
        assert_eq!(res.release(), Some((5, 5)));
        assert_eq!(
            res.ensure((5, 5), make),
            Ok(Some(FrameResourceEvent::Created { width: 5, height: 5 }))
        );
    }
}
