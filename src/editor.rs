use std::fs;
use std::process::Command;

/// Edit `initial_content` in `$EDITOR` (vi when unset) and return the saved
/// text with trailing newlines stripped.
pub fn open_editor(initial_content: &str) -> Result<String, String> {
    let editor = std::env::var("EDITOR").unwrap_or_else(|_| "vi".to_string());

    let tmp_file = std::env::temp_dir().join(format!("ficous_answer_{}.md", std::process::id()));
    fs::write(&tmp_file, initial_content)
        .map_err(|e| format!("Cannot write temp file: {}", e))?;

    let status = Command::new(&editor)
        .arg(&tmp_file)
        .status()
        .map_err(|e| format!("Cannot open editor '{}': {}", editor, e));

    let result = match status {
        Ok(s) if s.success() => fs::read_to_string(&tmp_file)
            .map(|text| text.trim_end_matches('\n').to_string())
            .map_err(|e| format!("Cannot read editor result: {}", e)),
        Ok(_) => Err("Editor exited with error".to_string()),
        Err(e) => Err(e),
    };

    let _ = fs::remove_file(&tmp_file);
    result
}
