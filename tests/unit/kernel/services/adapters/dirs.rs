use super::*;

#[test]
fn test_log_dir_is_under_app_dir() {
    if let Some(dir) = get_log_dir() {
        assert!(dir.ends_with("logs"));
        assert!(dir.to_string_lossy().contains("dashgrid"));
    }
}
