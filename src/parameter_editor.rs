// 参数面板：用滑块修改选中双摆的杆长、质量和初始角度

use double_pendulum::Parameter;
use macroquad::prelude::*;
use macroquad::ui::{Ui, hash, root_ui, widgets};
use tracing::{debug, warn};

use crate::app::AppState;

const PANEL_WIDTH: f32 = 320.0;
const PANEL_HEIGHT: f32 = 230.0;
const PANEL_MARGIN: f32 = 10.0;

/// 滑块编辑框里显示的文本，与 macroquad 内部保存的格式相同
fn shown_text(value: f64) -> String {
    format!("{value:.2}")
}

/// 一个滑块的控件状态。
///
/// macroquad 把上一帧的文本存在控件 id 下，文本变化时会把它解析回数据。
/// 值在面板之外被改动（运行、重置、切换选中）时换一个 id，控件就会按当前值重新初始化。
#[derive(Debug, Default)]
struct SliderSlot {
    generation: u32,
    shown: Option<String>,
}

impl SliderSlot {
    /// 绘制前调用，返回本帧使用的代数
    fn sync(&mut self, current: f64) -> u32 {
        let text = shown_text(current);
        if self.shown.as_deref() != Some(text.as_str()) {
            if self.shown.is_some() {
                self.generation = self.generation.wrapping_add(1);
            }
            self.shown = Some(text);
        }
        self.generation
    }

    /// 绘制后调用，记录控件现在持有的值
    fn record(&mut self, value: f64) {
        self.shown = Some(shown_text(value));
    }
}

/// 控件返回的值是否算一次真正的修改。
///
/// 只把显示精度内的舍入（例如 129.53127 显示成 129.53）当作未修改。
fn edited_value(before: f64, value: f32) -> Option<f64> {
    if value == before as f32 || shown_text(value as f64) == shown_text(before) {
        return None;
    }
    Some(value as f64)
}

pub struct ParameterEditor {
    pub visible: bool,
    /// 最近一次点击落在面板内
    focused: bool,
    slots: [SliderSlot; Parameter::EDITABLE.len()],
}

impl ParameterEditor {
    pub fn new() -> Self {
        Self {
            visible: true,
            focused: false,
            slots: Default::default(),
        }
    }

    fn panel_rect(screen_width: f32) -> Rect {
        Rect::new(screen_width - PANEL_WIDTH - PANEL_MARGIN, PANEL_MARGIN, PANEL_WIDTH, PANEL_HEIGHT)
    }

    /// 每帧在处理快捷键之前调用，`clicked_at` 为本帧鼠标左键按下的位置
    pub fn update_focus(&mut self, clicked_at: Option<Vec2>, screen_width: f32) {
        if let Some(point) = clicked_at {
            self.focused = self.visible && Self::panel_rect(screen_width).contains(point);
        }
    }

    /// 面板可编辑且获得焦点时，数字、删除和方向键留给编辑框
    pub fn captures_keyboard(&self, app: &AppState) -> bool {
        self.visible && self.focused && !app.running
    }

    pub fn draw(&mut self, app: &mut AppState) {
        if !self.visible {
            return;
        }

        let rect = Self::panel_rect(screen_width());
        let slots = &mut self.slots;
        widgets::Window::new(hash!(), rect.point(), rect.size())
            .label("Parameters")
            .movable(false)
            .ui(&mut root_ui(), |ui| {
                // 和原来的界面一样，运行中不允许修改
                if app.running {
                    ui.label(None, "Stop the simulation (SPACE) to edit.");
                    return;
                }

                ui.label(None, &format!("Pendulum #{}", app.selected + 1));
                for (parameter, slot) in Parameter::EDITABLE.into_iter().zip(slots.iter_mut()) {
                    Self::slider(ui, app, parameter, slot);
                }
            });
    }

    fn slider(ui: &mut Ui, app: &mut AppState, parameter: Parameter, slot: &mut SliderSlot) {
        let Some(entry) = app.selected_entry() else {
            return;
        };
        let before = parameter.to_display(entry.pendulum.parameter(parameter));
        let generation = slot.sync(before);
        let range = parameter.slider_range();
        let mut value = before as f32;

        ui.slider(
            hash!(parameter.key(), generation),
            parameter.label(),
            *range.start() as f32..*range.end() as f32,
            &mut value,
        );

        let Some(edited) = edited_value(before, value) else {
            slot.record(before);
            return;
        };
        slot.record(edited);
        match app.edit_selected(parameter, edited) {
            Ok(()) => debug!(%parameter, value = edited, "parameter edited"),
            Err(err) => warn!("rejected parameter edit: {err}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use double_pendulum::config::SimulationParams;

    #[test]
    fn untouched_slider_keeps_exact_state() {
        // 超出滑块范围的角度和非整数角度都不能被写回
        assert_eq!(edited_value(400.0, 400.0), None);
        assert_eq!(edited_value(129.531_27, 129.531_27_f64 as f32), None);
        assert_eq!(edited_value(129.531_27, 129.53), None);
        assert_eq!(edited_value(-517.25, -517.25), None);
    }

    #[test]
    fn dragged_or_typed_value_is_applied() {
        assert_eq!(edited_value(130.0, 90.0), Some(90.0));
        assert_eq!(edited_value(400.0, 180.0), Some(180.0));
        assert_eq!(edited_value(2.0, 2.5), Some(2.5));
    }

    #[test]
    fn outside_change_renews_slider_id() {
        let mut slot = SliderSlot::default();
        let first = slot.sync(130.0);
        slot.record(130.0);
        assert_eq!(slot.sync(130.0), first);

        // 运行后角度变了：换新 id，控件按 129.53127 重新初始化
        let after_run = slot.sync(129.531_27);
        assert_ne!(after_run, first);
        slot.record(129.531_27);
        assert_eq!(slot.sync(129.531_27), after_run);

        // 显示精度以内的变化不需要换 id
        assert_eq!(slot.sync(129.531_30), after_run);
        assert_ne!(slot.sync(400.0), after_run);
    }

    #[test]
    fn own_edit_does_not_renew_slider_id() {
        let mut slot = SliderSlot::default();
        let generation = slot.sync(130.0);
        slot.record(90.0);
        assert_eq!(slot.sync(90.0), generation);
    }

    #[test]
    fn keyboard_goes_to_panel_only_when_focused_and_stopped() {
        let mut app = AppState::new(&SimulationParams::default());
        let mut editor = ParameterEditor::new();
        let width = 1280.0;
        let inside = vec2(width - PANEL_WIDTH / 2.0, PANEL_HEIGHT / 2.0);

        editor.update_focus(Some(inside), width);
        assert!(editor.captures_keyboard(&app));

        app.running = true;
        assert!(!editor.captures_keyboard(&app));
        app.running = false;

        editor.update_focus(None, width);
        assert!(editor.captures_keyboard(&app));

        editor.update_focus(Some(vec2(100.0, 400.0)), width);
        assert!(!editor.captures_keyboard(&app));

        editor.update_focus(Some(inside), width);
        editor.visible = false;
        assert!(!editor.captures_keyboard(&app));
    }
}
