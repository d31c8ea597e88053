//! User-facing strings shared by the command line and the web front end.

pub const BOARD_TITLE: &str = "자유게시판";
pub const EMPTY_BOARD: &str = "게시글이 없습니다! 첫 글을 작성해보세요!";
pub const POST_NOT_FOUND: &str = "게시글을 찾을 수 없습니다.";
pub const POST_UPDATED: &str = "게시글이 수정되었습니다.";
pub const ACTION_FAILED: &str = "작업에 실패했습니다.";
pub const POST_DELETE_CONFIRM: &str = "게시글을 삭제하시겠습니까?";

pub const COMMENT_CREATE_FAILED: &str = "댓글을 작성하지 못 했습니다.";
pub const COMMENT_DELETE_FAILED: &str = "삭제에 실패하였습니다.";
pub const COMMENT_DELETE_CONFIRM: &str = "댓글을 삭제하시겠습니까?";
pub const COMMENT_PLACEHOLDER: &str = "댓글을 입력해주세요";

pub const EMAIL_IN_USE: &str = "이미 사용 중인 이메일입니다.";
pub const REGISTER_FAILED: &str = "회원가입이 실패되었습니다.";
pub const LOGIN_FAILED: &str = "로그인에 실패했습니다.";
pub const LOGGED_OUT: &str = "로그아웃 되었습니다.";

pub const COMMENT_REQUIRED: &str = "댓글 내용을 입력해주세요.";
pub const COMMENT_TOO_SHORT: &str = "최소 2글자 이상 입력해주세요.";
pub const TITLE_REQUIRED: &str = "제목은 필수 항목입니다.";
pub const CONTENT_REQUIRED: &str = "내용은 필수 항목입니다.";
pub const EMAIL_REQUIRED: &str = "이메일은 필수 입력입니다.";
pub const PASSWORD_REQUIRED: &str = "비밀번호는 필수 입력입니다.";
pub const PASSWORD_TOO_SHORT: &str = "비밀번호는 6자 이상이어야 합니다.";
pub const INVALID_INPUT: &str = "입력값을 확인해주세요.";

pub fn comment_count(count: usize) -> String {
    format!("댓글 {count}개")
}

pub fn welcome(label: &str) -> String {
    format!("환영합니다, {label}님!")
}
