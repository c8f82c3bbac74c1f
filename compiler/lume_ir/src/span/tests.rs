use super::*;

#[test]
fn test_span_basic() {
    let span = Span::new(10, 20);
    assert_eq!(span.len(), 10);
    assert!(!span.is_empty());
    assert!(!span.is_dummy());
}

#[test]
fn test_span_merge() {
    let merged = Span::new(10, 20).merge(Span::new(15, 30));
    assert_eq!(merged, Span::new(10, 30));
}

#[test]
fn test_dummy_span_falls_back() {
    let real = Span::new(3, 7);
    assert_eq!(Span::DUMMY.or(real), real);
    assert_eq!(real.or(Span::new(100, 200)), real);
}

#[test]
fn test_span_display() {
    assert_eq!(Span::new(4, 9).to_string(), "4..9");
    assert_eq!(Span::DUMMY.to_string(), "«none»");
}

#[test]
fn test_span_try_from_range() {
    assert_eq!(Span::try_from_range(50..100), Ok(Span::new(50, 100)));

    let large = u32::MAX as usize + 1;
    assert!(matches!(
        Span::try_from_range(large..large + 1),
        Err(SpanError::StartTooLarge(_))
    ));
    assert!(matches!(
        Span::try_from_range(0..large),
        Err(SpanError::EndTooLarge(_))
    ));
}
