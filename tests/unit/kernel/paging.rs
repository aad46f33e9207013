use super::*;

fn paging(current: u32, total: u32) -> PagingCoordinator {
    let mut p = PagingCoordinator::new();
    p.set_total_pages(total);
    if current > 0 {
        p.go_to(current);
    }
    p
}

#[test]
fn test_go_to_same_page_is_silent() {
    let mut p = paging(2, 5);
    assert_eq!(p.go_to(2), None);
    assert_eq!(p.current_page(), 2);
}

#[test]
fn test_go_to_out_of_range_is_silent() {
    let mut p = paging(1, 3);
    assert_eq!(p.go_to(4), None);
    assert_eq!(p.go_to(0), None);
    assert_eq!(p.current_page(), 1);
}

#[test]
fn test_go_to_raises_page_changed() {
    let mut p = paging(1, 3);
    assert_eq!(p.go_to(3), Some(PageChanged { page: 3 }));
    assert_eq!(p.current_page(), 3);
}

#[test]
fn test_initial_state_before_first_page() {
    let mut p = PagingCoordinator::new();
    assert_eq!(p.current_page(), 0);
    assert_eq!(p.refresh(), None);
    assert_eq!(p.go_to(1), Some(PageChanged { page: 1 }));
}

#[test]
fn test_navigation_disables_at_boundaries() {
    let p = paging(1, 3);
    assert_eq!(
        p.navigation(),
        NavState {
            first: false,
            prev: false,
            next: true,
            last: true
        }
    );

    let p = paging(3, 3);
    assert_eq!(
        p.navigation(),
        NavState {
            first: true,
            prev: true,
            next: false,
            last: false
        }
    );

    let p = paging(1, 1);
    assert_eq!(p.navigation(), NavState::default());
}

#[test]
fn test_set_total_pages_reevaluates_forward_navigation() {
    let mut p = paging(2, 2);
    assert!(!p.navigation().next);
    p.set_total_pages(4);
    assert_eq!(p.current_page(), 2);
    assert!(p.navigation().next);
    assert!(p.navigation().last);
}

#[test]
fn test_helpers() {
    let mut p = paging(2, 4);
    assert_eq!(p.prev(), Some(PageChanged { page: 1 }));
    assert_eq!(p.prev(), None);
    assert_eq!(p.last(), Some(PageChanged { page: 4 }));
    assert_eq!(p.next(), None);
    assert_eq!(p.first(), Some(PageChanged { page: 1 }));
    assert_eq!(p.next(), Some(PageChanged { page: 2 }));
    assert_eq!(p.refresh(), Some(PageChanged { page: 2 }));
    assert_eq!(p.current_page(), 2);
}

#[test]
fn test_zero_total_pages_clamps_to_one() {
    let mut p = PagingCoordinator::new();
    p.set_total_pages(0);
    assert_eq!(p.total_pages(), 1);
}

#[test]
fn test_restore_is_silent_and_clamped() {
    let mut p = paging(3, 5);
    p.restore(2);
    assert_eq!(p.current_page(), 2);
    assert_eq!(p.refresh(), Some(PageChanged { page: 2 }));
    p.restore(9);
    assert_eq!(p.current_page(), 5);
}
