//! The edited document: shaders, their tab order and the editor settings.

use std::collections::HashMap;

use serde::Deserialize;
use shaderbox_core::undo::Editable;

/// Code given to shaders created without any.
pub const DEFAULT_SHADER_CODE: &str = r#"@fragment
fn fragmentMain(@builtin(position) pos: vec4f) -> @location(0) vec4f {
    return vec4f(pos.xy / inputs.size, 0, 1);
}
"#;

/// Example shaders a fresh session starts with.
pub const EXAMPLE_SHADERS: [(&str, &str); 3] = [
    ("Hello World", DEFAULT_SHADER_CODE),
    (
        "Tutorial",
        r#"@fragment
fn fragmentMain(@builtin(position) pos: vec4f) -> @location(0) vec4f {
  let period = 5.0;
  let half_period = period / 2.0;
  let cycle_value = inputs.time % period;
  let b = half_period - abs(cycle_value - half_period);
  var color = vec4f(b / half_period, pos.xy / inputs.size, 1);
  if(length(pos.xy - inputs.mouse) <= 50.0) {
    color.a = 0.8;
  }
  return color;
}
"#,
    ),
    (
        "Shader Art",
        r#"fn palette(t: f32) -> vec3f {
  const a = vec3f(0.5, 0.5, 0.5);
  const b = vec3f(0.5, 0.5, 0.5);
  const c = vec3f(1.0, 1.0, 1.0);
  const d = vec3f(0.263, 0.416, 0.557);
  return a + (b * cos(6.28318 * ((c*t) + d)));
}

@fragment
fn fragmentMain(@builtin(position) pos: vec4f) -> @location(0) vec4f {
  var uv = (pos.xy * 2.0 - inputs.size) / inputs.size.y;
  let uv0 = uv;
  var finalColor = vec3f(0.0);

  for(var i = 0; i < 4; i++) {
    uv = fract(uv * 1.5) - 0.5;
    var d = length(uv) * exp(-length(uv0));
    var col = palette(length(uv0) + f32(i) * 0.4 + inputs.time * 0.4);
    d = sin(d * 8.0 + inputs.time) / 8.0;
    d = abs(d);
    d = pow(0.01 / d, 1.2);
    finalColor += col * d;
  }

  return vec4f(finalColor, 1.0);
}
"#,
    ),
];

/// A named fragment shader.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Shader {
    pub name: String,
    pub code: String,
}

impl Shader {
    pub fn new(name: impl Into<String>, code: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            code: code.into(),
        }
    }
}

/// Editor preferences. Replaced as a whole by
/// [`UpdateSettings`](crate::actions::UpdateSettings).
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub dark_style: bool,
    pub hidpi_aware: bool,
    pub layout_manual: bool,
    pub layout_swapped: bool,
    pub font_size: f32,
    pub line_spacing: f32,
    pub code_show_white_space: bool,
    pub screenshot_mime_type: String,
    pub screenshot_quality_percent: u8,
    pub project_filename: String,
    pub browser_auto_save: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            dark_style: true,
            hidpi_aware: true,
            layout_manual: false,
            layout_swapped: false,
            font_size: 13.0,
            line_spacing: 1.0,
            code_show_white_space: false,
            screenshot_mime_type: "image/png".into(),
            screenshot_quality_percent: 85,
            project_filename: "Shaderbox.json".into(),
            browser_auto_save: true,
        }
    }
}

/// The document every session action operates on.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Session {
    shaders: HashMap<String, Shader>,
    tabs: Vec<String>,
    current: Option<String>,
    settings: Settings,
}

impl Editable for Session {}

impl Session {
    pub fn new(settings: Settings) -> Self {
        Self {
            settings,
            ..Self::default()
        }
    }

    /// A session holding the [example shaders](EXAMPLE_SHADERS), the first
    /// one current.
    pub fn with_examples(settings: Settings) -> Self {
        let mut session = Self::new(settings);
        for (name, code) in EXAMPLE_SHADERS {
            session.add_shader(Shader::new(name, code), None);
        }
        session.current = session.tabs.first().cloned();
        session
    }

    /// Inserts (or replaces) a shader and makes it current.
    ///
    /// A new tab goes at `position` when it is in range, at the end
    /// otherwise. Replacing a shader keeps its tab where it is.
    pub fn add_shader(&mut self, shader: Shader, position: Option<usize>) {
        let name = shader.name.clone();
        if !self.tabs.contains(&name) {
            match position {
                Some(position) if position <= self.tabs.len() => {
                    self.tabs.insert(position, name.clone());
                }
                _ => self.tabs.push(name.clone()),
            }
        }
        self.shaders.insert(name.clone(), shader);
        self.current = Some(name);
    }

    /// Removes a shader and its tab.
    ///
    /// Returns the removed shader and the tab position it occupied. When the
    /// current shader goes away, the first remaining tab becomes current.
    pub fn delete_shader(&mut self, name: &str) -> (Option<Shader>, Option<usize>) {
        let position = self.tabs.iter().position(|tab| tab == name);
        if let Some(position) = position {
            self.tabs.remove(position);
        }
        let shader = self.shaders.remove(name);

        if self.current.as_deref().is_none_or(|current| current == name) {
            self.current = self.tabs.first().cloned();
        }
        (shader, position)
    }

    /// Replaces the code of a shader, returning the previous code.
    pub fn update_code(&mut self, name: &str, code: String) -> Option<String> {
        let shader = self.shaders.get_mut(name)?;
        Some(std::mem::replace(&mut shader.code, code))
    }

    /// Swaps in new settings, returning the previous ones.
    pub fn replace_settings(&mut self, settings: Settings) -> Settings {
        std::mem::replace(&mut self.settings, settings)
    }

    /// Makes `name` current. An unknown name leaves the selection alone;
    /// `None` clears it.
    pub fn select(&mut self, name: Option<&str>) {
        if let Some(name) = name
            && !self.shaders.contains_key(name)
        {
            return;
        }
        self.current = name.map(str::to_owned);
    }

    pub fn shader(&self, name: &str) -> Option<&Shader> {
        self.shaders.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.shaders.contains_key(name)
    }

    /// Shaders in tab order.
    pub fn shaders(&self) -> impl Iterator<Item = &Shader> {
        self.tabs.iter().filter_map(|name| self.shaders.get(name))
    }

    pub fn tabs(&self) -> &[String] {
        &self.tabs
    }

    pub fn tab_position(&self, name: &str) -> Option<usize> {
        self.tabs.iter().position(|tab| tab == name)
    }

    pub fn current(&self) -> Option<&Shader> {
        self.current.as_deref().and_then(|name| self.shaders.get(name))
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn len(&self) -> usize {
        self.shaders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.shaders.is_empty()
    }
}
