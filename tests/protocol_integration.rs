//! Rofi script-mode output of the current buffer

use clipshelf::history::ClipboardHistory;
use clipshelf::protocol::ListWriter;
use clipshelf::Settings;
use pretty_assertions::assert_eq;
use tempfile::TempDir;

const HEADER: &str = "\0use-hot-keys\x1ftrue\n\0keep-selection\x1ftrue\n\0markup-rows\x1ftrue\n";

async fn open(temp_dir: &TempDir, settings: Settings) -> ClipboardHistory {
    ClipboardHistory::new(&temp_dir.path().join("clipshelf.db"), settings)
        .await
        .unwrap()
}

#[tokio::test]
async fn test_empty_buffer_listing() {
    let temp_dir = TempDir::new().unwrap();
    let history = open(&temp_dir, Settings::default()).await;

    let output = ListWriter::new(&history).render(None).await.unwrap();
    assert_eq!(
        output,
        format!(
            "{}\0prompt\x1fBuffer 1\n (No entries in buffer 1)\0info\x1f0\n",
            HEADER
        )
    );
}

#[tokio::test]
async fn test_prompt_uses_buffer_name() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::from_conf_str("buffer_3_name = Work\n");
    let history = open(&temp_dir, settings).await;
    history.switch_buffer(3).await.unwrap();

    let output = ListWriter::new(&history).render(None).await.unwrap();
    assert!(output.contains("\0prompt\x1fWork\n"));
    assert!(output.ends_with(" (No entries in buffer 3)\0info\x1f0\n"));
}

#[tokio::test]
async fn test_rows_newest_first() {
    let temp_dir = TempDir::new().unwrap();
    let history = open(&temp_dir, Settings::default()).await;

    let a = history.store(b"alpha").await.unwrap().unwrap();
    let b = history.store(b"beta").await.unwrap().unwrap();

    let output = ListWriter::new(&history).render(None).await.unwrap();
    let rows: Vec<&str> = output.lines().skip(4).collect();
    assert_eq!(
        rows,
        vec![
            format!(" beta\0info\x1f{}", b.id),
            format!(" alpha\0info\x1f{}", a.id),
        ]
    );
}

#[tokio::test]
async fn test_pinned_rows_follow_separator() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings {
        separator_length: 3,
        ..Settings::default()
    };
    let history = open(&temp_dir, settings).await;

    let pinned = history.store(b"pinned").await.unwrap().unwrap();
    history.toggle_pin(pinned.id).await.unwrap();
    history.store(b"regular").await.unwrap();

    let output = ListWriter::new(&history).render(None).await.unwrap();
    let rows: Vec<&str> = output.lines().skip(4).collect();
    assert_eq!(rows.len(), 4);
    assert!(rows[0].starts_with(" regular"));
    // Pinned entries are listed among the regular rows too
    assert!(rows[1].starts_with(" pinned"));
    assert_eq!(rows[2], "───\0info\x1f0");
    assert!(rows[3].starts_with(" pinned"));
}

#[tokio::test]
async fn test_limit_caps_regular_rows() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings {
        limit: 3,
        ..Settings::default()
    };
    let history = open(&temp_dir, settings).await;

    for i in 0..10 {
        history.store(format!("row {}", i).as_bytes()).await.unwrap();
    }

    let output = ListWriter::new(&history).render(None).await.unwrap();
    assert_eq!(output.lines().skip(4).count(), 3);

    let output = ListWriter::new(&history).render(Some(7)).await.unwrap();
    assert_eq!(output.lines().skip(4).count(), 7);

    // Zero means "not given"
    let output = ListWriter::new(&history).render(Some(0)).await.unwrap();
    assert_eq!(output.lines().skip(4).count(), 3);
}

#[tokio::test]
async fn test_masked_password_row() {
    let temp_dir = TempDir::new().unwrap();
    let settings = Settings::from_conf_str("mask_passwords = 1\n");
    let history = open(&temp_dir, settings).await;

    let entry = history.store(b"Sw7!kP2@aZ").await.unwrap().unwrap();
    let output = ListWriter::new(&history).render(None).await.unwrap();
    assert!(output.contains(&format!(
        " Sw<span color='#DC2626'>****</span>2@aZ\0info\x1f{}\n",
        entry.id
    )));
}
