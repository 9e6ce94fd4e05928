use super::*;

#[test]
fn memory_resource_opens_independent_streams() {
    let res = Resource::from_bytes("r", vec![1u8, 2, 3]);

    let mut a = res.open().unwrap();
    let mut first = [0u8; 2];
    a.read_exact(&mut first).unwrap();
    assert_eq!(first, [1, 2]);

    let mut b = res.open().unwrap();
    let mut all = Vec::new();
    b.read_to_end(&mut all).unwrap();
    assert_eq!(all, vec![1, 2, 3]);
    assert!(res.path().is_none());
}

#[test]
fn missing_file_reports_path() {
    let res = Resource::from_path("r", "definitely/not/here.mp4");
    let err = res.open().err().unwrap();
    assert!(err.to_string().contains("definitely/not/here.mp4"));
}
