//! フォーム状態
//!
//! RawInput を唯一の正として保持し、描画層からの編集を受け付ける。
//! 値の変更時は派生フィールドを明示的に再計算する（購読の仕組みは持たない）。

use crate::derive::apply_derivations;
use crate::error::{Error, Result};
use crate::schema::FieldSchema;
use crate::types::{FieldErrors, RawInput};
use crate::validation::{validate, ValidationResult};

/// フォームの入力状態
#[derive(Debug, Clone)]
pub struct FormState<'s> {
    schema: &'s FieldSchema,
    input: RawInput,
    errors: FieldErrors,
    locked: bool,
}

impl<'s> FormState<'s> {
    pub fn new(schema: &'s FieldSchema) -> Self {
        Self {
            schema,
            input: RawInput::new(),
            errors: FieldErrors::new(),
            locked: false,
        }
    }

    /// 既存の入力から開始する（派生フィールドは元フィールドから計算し直す）
    pub fn with_input(schema: &'s FieldSchema, input: RawInput) -> Self {
        let sources: Vec<&'static str> = schema
            .fields()
            .iter()
            .filter_map(|f| f.derived_from)
            .collect();
        let input = sources
            .into_iter()
            .fold(input, |acc, source| apply_derivations(schema, acc, source));

        Self {
            input,
            ..Self::new(schema)
        }
    }

    pub fn schema(&self) -> &'s FieldSchema {
        self.schema
    }

    pub fn current_value(&self, name: &str) -> &str {
        self.input.get(name)
    }

    /// フィールドを更新し、依存する派生フィールドを再計算する
    pub fn set_value(&mut self, name: &str, value: impl Into<String>) -> Result<()> {
        if self.locked {
            return Err(Error::FormLocked);
        }
        let descriptor = self
            .schema
            .descriptor(name)
            .ok_or_else(|| Error::UnknownField(name.to_string()))?;
        if descriptor.is_derived() {
            return Err(Error::ReadOnlyField(name.to_string()));
        }

        let mut input = std::mem::take(&mut self.input);
        input.set(name, value);
        self.input = apply_derivations(self.schema, input, name);
        Ok(())
    }

    pub fn raw_input(&self) -> &RawInput {
        &self.input
    }

    /// 直近の検証で見つかった全エラー
    pub fn errors(&self) -> &FieldErrors {
        &self.errors
    }

    pub fn error_for(&self, name: &str) -> Option<&str> {
        self.errors.get(name).map(String::as_str)
    }

    /// 検証を実行し、エラー一覧を更新する
    pub fn validate(&mut self) -> ValidationResult {
        let result = validate(&self.input, self.schema);
        self.errors = result.errors().cloned().unwrap_or_default();
        result
    }

    /// 入力を丸ごと破棄する
    pub fn reset(&mut self) -> Result<()> {
        if self.locked {
            return Err(Error::FormLocked);
        }
        self.input = RawInput::new();
        self.errors.clear();
        Ok(())
    }

    pub fn is_locked(&self) -> bool {
        self.locked
    }

    /// 送信中は編集不可にする
    pub fn lock(&mut self) {
        self.locked = true;
    }

    pub fn unlock(&mut self) {
        self.locked = false;
    }
}
