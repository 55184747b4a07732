use std::{fs, path::Path};

/// Name force-included on every compile invocation.
pub const PRELUDE_HEADER_NAME: &str = "LevelUp.h";

const PRELUDE_CONTENTS: &str = r#"#pragma once

#ifdef LEVELUP_USE_STD_UNIQUE_PTR
#include <memory>
namespace LevelUp {
template <typename T> using unique_ptr = std::unique_ptr<T>;
}
#else
namespace LevelUp {
template <typename T> class unique_ptr {
public:
    unique_ptr() : ptr_(nullptr) {}
    explicit unique_ptr(T* p) : ptr_(p) {}
    ~unique_ptr() { delete ptr_; }
    unique_ptr(const unique_ptr&) = delete;
    unique_ptr& operator=(const unique_ptr&) = delete;
    T* operator->() const { return ptr_; }
    T& operator*() const { return *ptr_; }
    T* get() const { return ptr_; }
private:
    T* ptr_;
};
}
#endif
"#;

/// Writes the prelude header into `dir` if it isn't already present, and
/// returns its path. Idempotent: the header's contents never depend on the
/// target repository, so an existing file is left untouched.
pub fn ensure_prelude(dir: &Path) -> std::io::Result<std::path::PathBuf> {
    fs::create_dir_all(dir)?;
    let path = dir.join(PRELUDE_HEADER_NAME);
    if !path.exists() {
        fs::write(&path, PRELUDE_CONTENTS)?;
    }
    Ok(path)
}
