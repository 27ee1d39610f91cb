use super::*;

#[test]
fn test_empty_state() {
    let frame = render(&[], &ctx(80));
    assert_eq!(frame.plain_lines(), vec![TITLE, "", EMPTY_MESSAGE]);
    assert!(frame.order.is_empty());
    assert!(ClickMap::build(&frame).is_empty());
}

#[test]
fn test_empty_state_interactive_has_help() {
    let mut c = ctx(80);
    c.options.interactive = true;
    let text = render(&[], &c).to_plain_text();
    assert!(text.contains(EMPTY_MESSAGE));
    assert!(text.ends_with(HELP_TEXT));
}

#[test]
fn test_header_and_summary_bar() {
    let lines = render(&sample_groups(), &ctx(80)).plain_lines();
    assert_eq!(lines[0], "session-monitor  2 projects, 3 sessions");
    assert_eq!(lines[1], "");
    assert_eq!(lines[2], "● 1 working  ◆ 1 waiting  ○ 1 idle");
}

#[test]
fn test_group_boxes() {
    let lines = render(&sample_groups(), &ctx(60)).plain_lines();
    let top = lines.iter().position(|l| l.starts_with('╭')).unwrap();
    assert_eq!(lines[top - 1], "");
    assert!(lines[top + 1].starts_with("│ api/ /home/me/api"));
    assert!(lines[top + 2].starts_with("│ │ "));
    assert!(lines.iter().any(|l| l.starts_with('╰')));
    assert!(lines.iter().any(|l| l.contains("web/ /home/me/web")));
}

#[test]
fn test_every_line_fits_width() {
    let mut groups = sample_groups();
    groups[0].sessions[0].last_prompt = "x".repeat(300);
    for width in [20u16, 40, 60, 80, 120] {
        for line in render(&groups, &ctx(width)).plain_lines() {
            assert!(
                line.width() <= width as usize,
                "line wider than {}: {:?}",
                width,
                line
            );
        }
    }
}

#[test]
fn test_box_lines_have_equal_width() {
    let lines = render(&sample_groups(), &ctx(70)).plain_lines();
    let boxed: Vec<usize> = lines
        .iter()
        .filter(|l| l.starts_with('│') || l.starts_with('╭') || l.starts_with('╰'))
        .map(|l| l.width())
        .collect();
    assert!(!boxed.is_empty());
    assert!(boxed.iter().all(|w| *w == 68));
}

#[test]
fn test_zero_width_means_80() {
    let a = render(&sample_groups(), &ctx(0));
    let b = render(&sample_groups(), &ctx(80));
    assert_eq!(a, b);
}

#[test]
fn test_session_rows() {
    let text = render(&sample_groups(), &ctx(100)).to_plain_text();
    assert!(text.contains("├─ \"fix bug\""));
    assert!(text.contains("└─ (no description)"));
    assert!(text.contains("Bash: ls -la"));
    assert!(text.contains("⠋ Working"));
    assert!(text.contains("○ Idle"));
    assert!(text.contains("◆ Waiting"));
    assert!(text.contains("30s ago"));
}

#[test]
fn test_status_line_indents() {
    let lines = render(&sample_groups(), &ctx(100)).plain_lines();
    let first = lines.iter().position(|l| l.contains("├─")).unwrap();
    assert!(lines[first + 1].starts_with("│ │  "));
    let last = lines.iter().position(|l| l.contains("└─ (no")).unwrap();
    assert!(lines[last + 1].starts_with("│    "));
}

#[test]
fn test_long_detail_and_prompt_truncated() {
    let mut s = session("s1", "/p", Status::Working);
    s.detail = "d".repeat(50);
    s.last_prompt = "p".repeat(90);
    let text = render(&group_by_project(vec![s]), &ctx(200)).to_plain_text();
    assert!(text.contains(&format!("{}...", "d".repeat(37))));
    assert!(!text.contains(&"d".repeat(38)));
    assert!(text.contains(&format!("\"{}...\"", "p".repeat(67))));
}

#[test]
fn test_summary_toggle() {
    let mut s = session("s1", "/p", Status::Idle);
    s.last_prompt = "write tests".to_string();
    s.summary = "Test writing".to_string();
    let groups = group_by_project(vec![s]);

    let mut c = ctx(100);
    assert!(render(&groups, &c).to_plain_text().contains("└─ \"write tests\""));
    c.options.show_summary = true;
    assert!(render(&groups, &c).to_plain_text().contains("└─ Test writing"));
}

#[test]
fn test_summary_fallbacks() {
    assert_eq!(subtitle(&Session::new("a", "/p"), false), None);

    let mut s = Session::new("a", "/p");
    s.summary = "Claude Code".to_string();
    assert_eq!(subtitle(&s, true), None);

    s.last_prompt = "hi".to_string();
    assert_eq!(subtitle(&s, true), Some("\"hi\"".to_string()));

    let mut t = Session::new("b", "/p");
    t.summary = "Tab".to_string();
    assert_eq!(subtitle(&t, false), Some("Tab".to_string()));
}

#[test]
fn test_debug_mode_shows_short_id_and_pid() {
    let mut c = ctx(120);
    c.options.debug = true;
    let text = render(&sample_groups(), &c).to_plain_text();
    assert!(text.contains("\"fix bug\" (aaaa1111:4321)"));
    assert!(text.contains("└─ bbbb1111"));
}

#[test]
fn test_interactive_footer_with_status_message() {
    let mut c = ctx(100);
    c.options.interactive = true;
    c.status_message = Some("Switched to session".to_string());
    let lines = render(&sample_groups(), &c).plain_lines();
    let n = lines.len();
    assert_eq!(lines[n - 1], HELP_TEXT);
    assert_eq!(lines[n - 2], "Switched to session");
    assert_eq!(lines[n - 3], "");
}

#[test]
fn test_exited_and_unknown_labels() {
    let mut e = session("e", "/p", Status::Exited);
    e.detail = "Process ended".to_string();
    let u = session("u", "/p", Status::Unknown);
    let text = render(&group_by_project(vec![e, u]), &ctx(100)).to_plain_text();
    assert!(text.contains("✕ Exited"));
    assert!(text.contains("? Unknown"));
    assert!(text.contains("✕ 1 exited"));
}

#[test]
fn test_spinner_advances() {
    let groups = sample_groups();
    let mut c = ctx(100);
    c.spinner_frame = 3;
    assert!(render(&groups, &c).to_plain_text().contains("⠸ Working"));
    c.spinner_frame = 13;
    assert!(render(&groups, &c).to_plain_text().contains("⠸ Working"));
}

#[test]
fn test_render_is_idempotent() {
    let groups = sample_groups();
    let mut c = ctx(90);
    c.options.interactive = true;
    c.flashing
        .insert("aaaa1111-2222".to_string(), FlashPhase::On);
    let first = render(&groups, &c);
    let second = render(&groups, &c);
    assert_eq!(first, second);
    assert_eq!(first.to_plain_text(), second.to_plain_text());
}

#[test]
fn test_flash_only_changes_style() {
    let groups = sample_groups();
    let plain = render(&groups, &ctx(90));
    let mut c = ctx(90);
    c.flashing
        .insert("aaaa1111-2222".to_string(), FlashPhase::On);
    let flashing = render(&groups, &c);

    assert_eq!(plain.plain_lines(), flashing.plain_lines());
    assert_ne!(plain.lines, flashing.lines);
}

#[test]
fn test_flash_phase_cycle() {
    let start = Instant::now();
    let until = start + FLASH_DURATION;
    assert_eq!(flash_phase(start, until), Some(FlashPhase::On));
    assert_eq!(
        flash_phase(start + Duration::from_millis(160), until),
        Some(FlashPhase::Off)
    );
    assert_eq!(
        flash_phase(start + Duration::from_millis(310), until),
        Some(FlashPhase::On)
    );
    assert_eq!(flash_phase(until, until), None);
    assert_eq!(flash_phase(until + Duration::from_secs(1), until), None);
}

#[test]
fn test_truncate_ellipsis() {
    assert_eq!(truncate_ellipsis("short", 40), "short");
    assert_eq!(truncate_ellipsis("abcdefghij", 8), "abcde...");
}

#[test]
fn test_control_characters_stay_on_one_line() {
    let mut s = session("s1", "/home/me/a\npi", Status::Working);
    s.last_prompt = "fix\nthe bug".to_string();
    s.detail = "Bash: cat <<EOF\r\n\tdone".to_string();
    let frame = render(&group_by_project(vec![s]), &ctx(80));

    let text = frame.to_plain_text();
    assert_eq!(frame.lines.len(), text.lines().count());
    assert!(text.contains("\"fix the bug\""));
    assert!(!text.contains('\t'));
}

#[test]
fn test_single_line() {
    assert_eq!(single_line("a\nb\r\tc\u{1b}"), "a b  c ");
    assert_eq!(single_line("plain"), "plain");
}
