use std::cmp::Ordering;
use std::path::PathBuf;

/// One source image of a sequence.
///
/// `frame_number` is `None` when the filename carried no parseable number.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct FrameRef {
    pub path: PathBuf,
    pub frame_number: Option<i64>,
}

impl FrameRef {
    pub fn new(path: impl Into<PathBuf>, frame_number: Option<i64>) -> Self {
        Self {
            path: path.into(),
            frame_number,
        }
    }

    /// Feed order: ascending frame number, unnumbered frames last.
    pub fn feed_order(&self, other: &FrameRef) -> Ordering {
        match (self.frame_number, other.frame_number) {
            (Some(a), Some(b)) => a.cmp(&b),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        }
    }

    pub fn label(&self) -> String {
        match self.frame_number {
            Some(n) => format!("{n:04}"),
            None => "----".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_feed_order_sorts_numbers_ascending() {
        let mut frames = vec![
            FrameRef::new("a_5.png", Some(5)),
            FrameRef::new("a_3.png", Some(3)),
            FrameRef::new("a_4.png", Some(4)),
        ];
        frames.sort_by(FrameRef::feed_order);
        let numbers: Vec<_> = frames.iter().map(|f| f.frame_number).collect();
        assert_eq!(numbers, vec![Some(3), Some(4), Some(5)]);
    }

    #[test]
    fn test_unnumbered_frames_sort_last_and_keep_relative_order() {
        let mut frames = vec![
            FrameRef::new("a_x.png", None),
            FrameRef::new("a_2.png", Some(2)),
            FrameRef::new("a_y.png", None),
            FrameRef::new("a_1.png", Some(1)),
        ];
        frames.sort_by(FrameRef::feed_order);
        let paths: Vec<_> = frames
            .iter()
            .map(|f| f.path.to_string_lossy().into_owned())
            .collect();
        assert_eq!(paths, vec!["a_1.png", "a_2.png", "a_x.png", "a_y.png"]);
    }

    #[test]
    fn test_label_pads_frame_number() {
        assert_eq!(FrameRef::new("a", Some(7)).label(), "0007");
        assert_eq!(FrameRef::new("a", None).label(), "----");
    }
}
