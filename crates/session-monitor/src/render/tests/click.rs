use super::*;

#[test]
fn test_click_map_round_trip() {
    let groups = sample_groups();
    let frame = render(&groups, &ctx(80));
    let map = ClickMap::build(&frame);
    let lines = frame.plain_lines();

    assert_eq!(
        frame.order,
        vec!["aaaa1111-2222", "bbbb1111-2222", "cccc1111-2222"]
    );
    for id in &frame.order {
        let mapped = map.lines_for(id);
        assert_eq!(mapped.len(), 2, "{id}");
        let identity = &lines[mapped[0]];
        assert!(identity.contains("├─") || identity.contains("└─"));
        assert_eq!(mapped[1], mapped[0] + 1);
    }
}

#[test]
fn test_lines_without_marker_resolve_to_none() {
    let frame = render(&sample_groups(), &ctx(80));
    let map = ClickMap::build(&frame);
    for (index, line) in frame.plain_lines().iter().enumerate() {
        let mapped = map.resolve(index).is_some();
        let is_title = line.contains("api/ ") || line.contains("web/ ");
        let is_border = line.starts_with('╭') || line.starts_with('╰');
        if index < 3 || is_title || is_border || line.is_empty() {
            assert!(!mapped, "line {index} should not resolve: {line:?}");
        }
    }
    assert_eq!(map.resolve(frame.lines.len() + 10), None);
}

#[test]
fn test_click_map_survives_toggles() {
    let groups = sample_groups();
    let mut c = ctx(50);
    c.options.debug = true;
    c.options.interactive = true;
    c.status_message = Some("Focus failed".to_string());
    let frame = render(&groups, &c);
    let map = ClickMap::build(&frame);
    assert_eq!(map.len(), 6);
    for id in &frame.order {
        assert_eq!(map.lines_for(id).len(), 2);
    }
}

#[test]
fn test_click_map_prompt_with_connector_glyph() {
    let mut s = session("s1", "/p", Status::Idle);
    s.detail = "├─ odd detail".to_string();
    s.last_prompt = "└─ quoted".to_string();
    let frame = render(&group_by_project(vec![s]), &ctx(80));
    let map = ClickMap::build(&frame);
    assert_eq!(map.len(), 2);
    assert_eq!(map.lines_for("s1").len(), 2);
}

#[test]
fn test_connector_in_project_name_does_not_shift_rows() {
    let mut first = session("s1", "/tmp/├─x", Status::Idle);
    first.last_prompt = "one".to_string();
    let mut second = session("s2", "/tmp/├─x", Status::Idle);
    second.last_prompt = "two".to_string();
    let frame = render(&group_by_project(vec![first, second]), &ctx(80));
    let map = ClickMap::build(&frame);
    let lines = frame.plain_lines();

    let title = lines.iter().position(|l| l.contains("/tmp/├─x")).unwrap();
    assert_eq!(map.resolve(title), None);
    for id in ["s1", "s2"] {
        let mapped = map.lines_for(id);
        assert_eq!(mapped.len(), 2, "{id}");
        assert!(lines[mapped[0]].contains(if id == "s1" { "one" } else { "two" }));
    }
}
