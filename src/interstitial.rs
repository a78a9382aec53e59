//! “资源不存在”提示页的占用标记
//!
//! 提示页显示期间占用该标记，会话层的延迟跳转据此让路，避免两个导航互相竞争。

use std::cell::Cell;
use std::rc::Rc;

#[derive(Clone, Default)]
pub struct NotFoundInterstitial {
    displayed: Rc<Cell<usize>>,
}

impl NotFoundInterstitial {
    pub fn new() -> Self {
        Self::default()
    }

    /// 提示页挂载时调用；返回的凭证被 drop 时释放
    pub fn claim(&self) -> InterstitialClaim {
        self.displayed.set(self.displayed.get() + 1);
        InterstitialClaim {
            displayed: self.displayed.clone(),
        }
    }

    pub fn is_displayed(&self) -> bool {
        self.displayed.get() > 0
    }
}

#[must_use = "dropping the claim releases the interstitial"]
pub struct InterstitialClaim {
    displayed: Rc<Cell<usize>>,
}

impl Drop for InterstitialClaim {
    fn drop(&mut self) {
        self.displayed.set(self.displayed.get().saturating_sub(1));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_claims_are_counted() {
        let interstitial = NotFoundInterstitial::new();
        assert!(!interstitial.is_displayed());
        let a = interstitial.claim();
        let b = interstitial.clone().claim();
        drop(a);
        assert!(interstitial.is_displayed());
        drop(b);
        assert!(!interstitial.is_displayed());
    }
}
